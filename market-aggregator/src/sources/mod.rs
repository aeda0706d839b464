pub mod academic;
pub mod clinical_trials;
pub mod fallback;
pub mod news;
pub mod patents;
pub mod preprints;

pub use academic::AcademicSource;
pub use clinical_trials::ClinicalTrialsSource;
pub use fallback::FallbackChain;
pub use news::NewsSource;
pub use patents::PatentSource;
pub use preprints::PreprintSource;
