//! LinkScope client: agent HTTP surface, push-stream decoding and the IO
//! worker the shell drives with effects.
mod api;
mod bundle;
mod error;
mod handle;
mod settings;
mod stream;

pub use api::{BundlePayload, DiagnosticsApi, HttpApi};
pub use bundle::{attachment_filename, save_bundle, DEFAULT_BUNDLE_NAME};
pub use error::{ApiError, BundleError, StartError, VendorSubmitError};
pub use handle::{ClientEvent, ClientHandle};
pub use settings::{ClientSettings, DEFAULT_BASE_URL};
