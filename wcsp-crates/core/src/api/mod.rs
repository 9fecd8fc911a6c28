mod wcsp;

pub use wcsp::Wcsp;

pub mod termination {
    //! Conditions which interrupt the enforcement of virtual arc consistency.
    pub use crate::engine::termination::*;
}

pub mod options {
    pub use crate::vac::BottleneckTieBreaking;
    pub use crate::vac::VacOptions;
}
