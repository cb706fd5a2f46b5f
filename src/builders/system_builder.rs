//! Builder wiring the reservation core together from configuration.

use std::sync::Arc;

use crate::config::BookingConfig;
use crate::core::{
    AdmissionController, BookingError, BookingStore, CheckInTokenService, ConflictDetector,
    PaymentReconciler, SharedAuditSink, SlotAuthoring, SlotStore, WaitlistPromoter,
};
use crate::infra::gateway::{PaymentGateway, RecordingGateway};
use crate::infra::notify::{Notifier, NullNotifier};
use crate::util::{Clock, SystemClock};

/// The fully wired reservation core.
///
/// All components take `&self` and are safe to share behind an `Arc` across
/// request handlers.
pub struct BookingSystem {
    /// Slot definitions and seat accounting.
    pub slots: Arc<SlotStore>,
    /// Booking records and state machine.
    pub bookings: Arc<BookingStore>,
    /// Booking admission and cancellation.
    pub admission: AdmissionController,
    /// Payment event reconciliation and expiry.
    pub reconciler: Arc<PaymentReconciler>,
    /// Waitlist promotion.
    pub waitlist: Arc<WaitlistPromoter>,
    /// Check-in tokens and attendance.
    pub checkin: Arc<CheckInTokenService>,
    /// Slot creation and edits.
    pub authoring: SlotAuthoring,
    /// Policy the system was built with.
    pub config: BookingConfig,
}

/// Builder for [`BookingSystem`]. Defaults: system clock, null notifier,
/// recording gateway, no audit sink.
pub struct BookingSystemBuilder {
    config: BookingConfig,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    gateway: Arc<dyn PaymentGateway>,
    audit: Option<SharedAuditSink>,
}

impl BookingSystemBuilder {
    /// Start a builder from policy configuration.
    #[must_use]
    pub fn new(config: BookingConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(NullNotifier),
            gateway: Arc::new(RecordingGateway::new()),
            audit: None,
        }
    }

    /// Use a custom time source (tests inject a manual clock here).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a custom notifier boundary.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Use a custom payment gateway boundary.
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    /// Attach an audit sink shared by all components.
    #[must_use]
    pub fn with_audit(mut self, audit: SharedAuditSink) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate configuration and wire the system.
    pub fn build(self) -> Result<BookingSystem, BookingError> {
        self.config
            .validate()
            .map_err(|e| BookingError::InvalidRequest(format!("config invalid: {e}")))?;

        let slots = Arc::new(SlotStore::new());
        let bookings = Arc::new(BookingStore::new());

        let waitlist = Arc::new(WaitlistPromoter::new(
            Arc::clone(&slots),
            Arc::clone(&bookings),
            Arc::clone(&self.notifier),
            Arc::clone(&self.clock),
            self.config.clone(),
            self.audit.clone(),
        ));
        let checkin = Arc::new(CheckInTokenService::new(
            Arc::clone(&bookings),
            Arc::clone(&slots),
            Arc::clone(&self.clock),
            self.config.clone(),
            self.audit.clone(),
        ));
        let reconciler = Arc::new(PaymentReconciler::new(
            Arc::clone(&slots),
            Arc::clone(&bookings),
            Arc::clone(&waitlist),
            Arc::clone(&checkin),
            Arc::clone(&self.gateway),
            Arc::clone(&self.notifier),
            Arc::clone(&self.clock),
            self.config.clone(),
            self.audit.clone(),
        ));
        let admission = AdmissionController::new(
            Arc::clone(&slots),
            Arc::clone(&bookings),
            Arc::clone(&waitlist),
            Arc::clone(&self.notifier),
            Arc::clone(&self.clock),
            self.config.clone(),
            self.audit.clone(),
        );
        let authoring = SlotAuthoring::new(
            Arc::clone(&slots),
            ConflictDetector::new(Arc::clone(&slots)),
            self.audit.clone(),
        );

        Ok(BookingSystem {
            slots,
            bookings,
            admission,
            reconciler,
            waitlist,
            checkin,
            authoring,
            config: self.config,
        })
    }
}
