//! Built-in reference tables.
//!
//! Coefficients follow EU Directive 2020/2184 and the WHO drinking-water
//! guidelines (2022) where a norm exists; research values otherwise.

use super::types::{
    CatalogSpec, CategoryDefinition, EquivalenceGroup, ParameterClass, ParameterSpec, ScoringKind,
};

pub const BUILTIN_VERSION: &str = "5.4";

const EU: &str = "EU Directive 2020/2184";
const WHO: &str = "WHO Guidelines 2022";
const FR_INDICATOR: &str = "French indicator";
const FR_HEALTH_CODE: &str = "French public health code";

fn threshold(
    code: &str,
    name: &str,
    category: &str,
    unit: &str,
    (ideal, max, alpha): (f64, f64, f64),
    impact: &str,
    norm: &str,
) -> ParameterSpec {
    ParameterSpec {
        code: code.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        unit: unit.to_string(),
        scoring: ScoringKind::ThresholdMax { ideal, max, alpha },
        impact: impact.to_string(),
        norm: norm.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn optimal(
    code: &str,
    name: &str,
    category: &str,
    unit: &str,
    (ideal, beta, gamma): (f64, f64, f64),
    (min_acceptable, max_acceptable): (f64, f64),
    impact: &str,
    norm: &str,
) -> ParameterSpec {
    ParameterSpec {
        code: code.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        unit: unit.to_string(),
        scoring: ScoringKind::OptimalCentral {
            ideal,
            beta,
            gamma,
            min_acceptable: Some(min_acceptable),
            max_acceptable: Some(max_acceptable),
        },
        impact: impact.to_string(),
        norm: norm.to_string(),
    }
}

fn category(
    key: &str,
    name: &str,
    description: &str,
    weight: f64,
    class: ParameterClass,
    (critical, moderate, minor): (&[&str], &[&str], &[&str]),
) -> CategoryDefinition {
    let owned = |codes: &[&str]| codes.iter().map(|c| c.to_string()).collect();
    CategoryDefinition {
        key: key.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        weight,
        class,
        critical: owned(critical),
        moderate: owned(moderate),
        minor: owned(minor),
    }
}

fn group(logical_name: &str, codes: &[&str]) -> EquivalenceGroup {
    let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
    EquivalenceGroup {
        logical_name: logical_name.to_string(),
        priority_order: codes.clone(),
        codes,
    }
}

/// The built-in catalog tables, unvalidated.
pub fn builtin_spec() -> CatalogSpec {
    CatalogSpec {
        version: Some(BUILTIN_VERSION.to_string()),
        categories: builtin_categories(),
        parameters: builtin_parameters(),
        equivalence_groups: builtin_groups(),
    }
}

fn builtin_categories() -> Vec<CategoryDefinition> {
    use ParameterClass::*;
    vec![
        category(
            "microbiological",
            "Microbiology",
            "Bacteria and pathogens, immediate health stake",
            0.23,
            Microbiological,
            (&["1506", "1449", "1507", "6455"], &["1042", "1447"], &["5440"]),
        ),
        category(
            "heavy_metals",
            "Heavy metals",
            "Toxic and carcinogenic elements, bioaccumulation",
            0.16,
            HeavyMetal,
            (&["1369", "1382", "1388", "1392"], &["1375", "1394"], &["1393"]),
        ),
        category(
            "pfas",
            "PFAS",
            "Persistent per- and polyfluoroalkyl substances",
            0.13,
            SeasonalContaminant,
            (&["6561", "PFOA"], &["5979", "8741"], &[]),
        ),
        category(
            "nitrates",
            "Nitrates",
            "Agricultural and industrial pollution, risk for infants",
            0.10,
            SeasonalContaminant,
            (&["1340", "1335", "1339"], &[], &[]),
        ),
        category(
            "pesticides",
            "Pesticides",
            "Plant-protection residues and biocides",
            0.10,
            SeasonalContaminant,
            (
                &["6276", "ATRAZ"],
                &["6389", "1128", "1210", "1950", "6393", "PEST"],
                &[],
            ),
        ),
        category(
            "general_chemistry",
            "General chemistry",
            "Comfort and general quality parameters",
            0.08,
            StablePhysicoChemical,
            (&[], &["1337", "1338", "1345", "1841"], &["1374", "1372", "1367"]),
        ),
        category(
            "organoleptic",
            "Organoleptic",
            "Sensory acceptability and physico-chemical indicators",
            0.08,
            StablePhysicoChemical,
            (&["1302"], &["1303", "1304", "1295"], &["1309"]),
        ),
        category(
            "pharmaceuticals",
            "Pharmaceuticals",
            "Drug residues, antibiotic resistance",
            0.05,
            Unclassified,
            (&["ANTIBIO"], &[], &[]),
        ),
        category(
            "microplastics",
            "Microplastics",
            "Microscopic plastic pollution, emerging concern",
            0.05,
            Unclassified,
            (&[], &["MICROPL"], &[]),
        ),
        category(
            "chlorine",
            "Chlorine",
            "Disinfection residual, protection versus taste",
            0.02,
            DisinfectantResidual,
            (&[], &["1398", "1399", "1959", "1958"], &[]),
        ),
    ]
}

fn builtin_parameters() -> Vec<ParameterSpec> {
    let mut params = Vec::with_capacity(47);

    // microbiology
    let m = "microbiological";
    params.extend([
        threshold("1506", "E. coli", m, "n/100mL", (0.0, 0.0, 1.0), "Gastroenteritis risk", EU),
        threshold("1449", "E. coli (MF)", m, "n/100mL", (0.0, 0.0, 1.0), "Gastroenteritis risk", EU),
        threshold("1507", "Enterococci", m, "n/100mL", (0.0, 0.0, 1.0), "Faecal contamination indicator", EU),
        threshold("6455", "Enterococci (MS)", m, "n/100mL", (0.0, 0.0, 1.0), "Faecal contamination indicator", EU),
        threshold("1042", "Sulphite-reducing bacteria", m, "n/100mL", (0.0, 10.0, 1.2), "Indicator of past pollution", FR_INDICATOR),
        threshold("1447", "Coliform bacteria", m, "n/100mL", (0.0, 50.0, 1.3), "General contamination indicator", FR_INDICATOR),
        threshold("5440", "Aerobic bacteria 22°C", m, "CFU/mL", (0.0, 100.0, 1.1), "General microbiological quality", FR_INDICATOR),
    ]);

    // heavy metals
    let h = "heavy_metals";
    params.extend([
        threshold("1369", "Arsenic", h, "µg/L", (0.0, 10.0, 1.5), "Carcinogenic, chronic toxicity", EU),
        threshold("1382", "Lead", h, "µg/L", (0.0, 10.0, 1.5), "Neurotoxic, especially for children", EU),
        threshold("1388", "Cadmium", h, "µg/L", (0.0, 5.0, 1.5), "Carcinogenic, kidney toxicity", EU),
        threshold("1392", "Mercury", h, "µg/L", (0.0, 1.0, 2.0), "Major neurotoxin, bioaccumulation", EU),
        threshold("1375", "Chromium", h, "µg/L", (0.0, 50.0, 1.3), "Potentially carcinogenic depending on form", EU),
        threshold("1394", "Manganese", h, "µg/L", (0.0, 50.0, 1.4), "Metallic taste, brown colouring", WHO),
        threshold("1393", "Total iron", h, "µg/L", (0.0, 200.0, 1.2), "Metallic taste, water colouring", EU),
    ]);

    // pfas
    let p = "pfas";
    params.extend([
        threshold("6561", "PFOS", p, "ng/L", (0.0, 500.0, 1.8), "Endocrine disruptor, bioaccumulation", WHO),
        threshold("PFOA", "PFOA", p, "ng/L", (0.0, 500.0, 1.8), "Probable carcinogen", WHO),
        threshold("5979", "PFPeA", p, "ng/L", (0.0, 500.0, 1.8), "Environmental persistence", "WHO PFAS equivalence"),
        threshold("8741", "PFDoDS", p, "ng/L", (0.0, 1000.0, 1.5), "Tissue accumulation", "PFAS research"),
    ]);

    // nitrates
    let n = "nitrates";
    params.extend([
        threshold("1340", "Nitrates", n, "mg/L", (0.0, 50.0, 1.2), "Methaemoglobinaemia in infants", EU),
        threshold("1335", "Nitrites", n, "mg/L", (0.0, 0.5, 1.5), "Acute methaemoglobinaemia", EU),
        threshold("1339", "Nitrites (NO2)", n, "mg/L", (0.0, 0.5, 1.5), "Acute methaemoglobinaemia", EU),
    ]);

    // pesticides
    let s = "pesticides";
    params.extend([
        threshold("6276", "Total pesticides", s, "µg/L", (0.0, 0.5, 1.4), "Cocktail effect, endocrine disruption", EU),
        threshold("ATRAZ", "Atrazine", s, "µg/L", (0.0, 0.1, 1.6), "Endocrine disruptor, possible carcinogen", EU),
        threshold("6389", "Clothianidin", s, "µg/L", (0.0, 0.1, 1.4), "Neonicotinoid, neurotoxicity", EU),
        threshold("1128", "Captan", s, "µg/L", (0.0, 0.1, 1.3), "Fungicide, mucous membrane irritation", EU),
        threshold("1210", "Malathion", s, "µg/L", (0.0, 0.1, 1.3), "Organophosphate, neurotoxicity", EU),
        threshold("1950", "Kresoxim-methyl", s, "µg/L", (0.0, 0.1, 1.3), "Fungicide, aquatic toxicity", EU),
        threshold("6393", "Flonicamid", s, "µg/L", (0.0, 0.1, 1.4), "Insecticide, metabolic disruption", EU),
        threshold("PEST", "Pesticides (sum)", s, "µg/L", (0.0, 0.5, 1.4), "Combined toxicity", EU),
    ]);

    params.extend([
        threshold("MICROPL", "Microplastics", "microplastics", "particles/L", (0.0, 1000.0, 1.2), "Chronic inflammation, pollutant carrier", "WHO research 2019"),
        threshold("ANTIBIO", "Antibiotics", "pharmaceuticals", "ng/L", (0.0, 100.0, 1.3), "Antibiotic resistance, microbiome disruption", "WHO One Health"),
    ]);

    // organoleptic
    let o = "organoleptic";
    params.extend([
        optimal("1302", "pH", o, "", (7.2, 25.0, 1.6), (6.5, 9.0), "Drinking comfort, pipe corrosion", EU),
        optimal("1303", "Conductivity", o, "µS/cm", (400.0, 0.015, 1.3), (100.0, 1200.0), "Mineralisation indicator, taste", EU),
        optimal("1304", "Turbidity", o, "NFU", (0.1, 40.0, 1.4), (0.0, 2.0), "Visual acceptability, disinfection efficiency", EU),
        optimal("1295", "Turbidity (NFU)", o, "NFU", (0.1, 40.0, 1.4), (0.0, 2.0), "Visual acceptability, disinfection efficiency", EU),
        optimal("1309", "Colour", o, "mg/L Pt", (5.0, 2.0, 1.5), (0.0, 15.0), "Visual acceptability", EU),
    ]);

    // chlorine
    let c = "chlorine";
    params.extend([
        optimal("1398", "Free chlorine", c, "mg/L", (0.2, 100.0, 1.8), (0.1, 0.5), "Microbiological protection versus chlorine taste", FR_HEALTH_CODE),
        optimal("1399", "Total chlorine", c, "mg/L", (0.3, 80.0, 1.6), (0.1, 1.0), "Residual disinfection, taste", FR_HEALTH_CODE),
        optimal("1959", "Free chlorine (alt)", c, "mg/L", (0.2, 100.0, 1.8), (0.1, 0.5), "Microbiological protection versus chlorine taste", FR_HEALTH_CODE),
        optimal("1958", "Total chlorine (alt)", c, "mg/L", (0.3, 80.0, 1.6), (0.1, 1.0), "Residual disinfection, taste", FR_HEALTH_CODE),
    ]);

    // general chemistry
    let g = "general_chemistry";
    params.extend([
        optimal("1337", "Chlorides", g, "mg/L", (50.0, 0.02, 1.3), (10.0, 250.0), "Salty taste, corrosion", EU),
        optimal("1338", "Sulphates", g, "mg/L", (100.0, 0.01, 1.4), (20.0, 250.0), "Bitter taste, laxative at high doses", EU),
        optimal("1345", "Total hardness", g, "°f", (15.0, 0.5, 1.2), (6.0, 32.0), "Scaling versus aggressive water", "WHO recommendations"),
        optimal("1841", "Total organic carbon", g, "mg/L", (1.0, 2.0, 1.5), (0.0, 4.0), "Organic pollution, by-product precursor", "French quality indicator"),
        optimal("1374", "Calcium", g, "mg/L", (100.0, 0.001, 1.0), (20.0, 300.0), "Nutritional benefit, scaling", WHO),
        optimal("1372", "Magnesium", g, "mg/L", (30.0, 0.01, 1.1), (10.0, 100.0), "Nutritional benefit, hardness", WHO),
        optimal("1367", "Potassium", g, "mg/L", (10.0, 0.01, 1.0), (1.0, 50.0), "Electrolyte balance", WHO),
    ]);

    params
}

fn builtin_groups() -> Vec<EquivalenceGroup> {
    vec![
        group("E. coli", &["1506", "1449"]),
        group("Enterococci", &["1507", "6455"]),
        group("Turbidity", &["1304", "1295"]),
        group("Nitrites", &["1335", "1339"]),
        group("Free chlorine", &["1398", "1959"]),
        group("Total chlorine", &["1399", "1958"]),
        group("Total pesticides", &["6276", "PEST"]),
    ]
}
