pub mod mock;
pub mod unavailable;

#[cfg(feature = "backend-tract")]
pub mod tract;

pub use mock::MockDetector;
pub use unavailable::UnavailableDetector;

#[cfg(feature = "backend-tract")]
pub use tract::TractPersonDetector;
