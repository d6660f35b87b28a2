pub mod booking;
pub mod review;

pub use booking::ConsultationService;
pub use review::ReviewService;
