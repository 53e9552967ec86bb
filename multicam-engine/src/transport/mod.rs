mod rtc_transport;
mod session_transport;
mod transport_config;
mod transport_event;

pub use rtc_transport::{RtcTransport, RtcTransportFactory};
pub use session_transport::{MediaBinding, SessionTransport, TransportFactory};
pub use transport_config::TransportConfig;
pub use transport_event::{RemoteTrack, TransportEvent, TransportState};
