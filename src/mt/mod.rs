/// Machine Translation Module
///
/// The translation capability used to fill phrases that are missing from a
/// target locale. The sync engine depends only on the `MachineTranslator`
/// trait; concrete providers live alongside it.
///
/// 1. **MT Trait** - `MachineTranslator`, one async call per phrase
/// 2. **Google Translate** - production provider over the v2 REST API
/// 3. **Mock** - deterministic offline provider for tests and `--mock` runs
pub mod error;
pub mod google_translate;
pub mod mock;
pub mod translator;

pub use error::{MtError, MtResult};
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use translator::MachineTranslator;
