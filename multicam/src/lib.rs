pub use multicam_core::model::PeerId;

pub mod model {
    pub use multicam_core::model::*;
}

#[cfg(feature = "engine")]
pub mod engine {
    pub use multicam_engine::*;
}
