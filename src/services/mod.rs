// Service exports
pub mod geocoder;
pub mod notifier;
pub mod qr;
pub mod registry;

pub use geocoder::{with_retry, DisabledGeocoder, GeocodeError, Geocoder, NominatimGeocoder, RetryPolicy};
pub use notifier::{
    render_confirmation, ConfirmationLinks, HttpMailNotifier, LogNotifier, Notification, Notifier,
    NotifyError,
};
pub use qr::{QrError, QrImage, QrRenderer, SvgQrRenderer};
pub use registry::{register_event, InMemoryRegistry, Registry, RegistryError, SharedEvent};
