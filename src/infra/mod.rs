//! Infrastructure adapters for payment gateways and notification delivery.

pub mod gateway;
pub mod notify;

pub use gateway::{ChargeRequest, PaymentGateway, RecordingGateway};
pub use notify::{BookingNotice, InMemoryNotifier, NoticeKind, Notifier, NullNotifier};
