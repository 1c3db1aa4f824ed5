pub mod history;
pub mod input;
pub mod types;
pub mod value;

pub use history::{
    build_histories, AgeBucket, HistorySummary, ParameterHistory, Sample, TemporalWindows,
};
pub use input::{
    load_observations, parse_sample_date, ObservationInput, ObservationRecord, Provenance,
};
pub use types::RawObservation;
pub use value::clean_numeric_value;
