use bitflags::bitflags;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

bitflags! {
    /// Contents of the configuration register.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
    pub struct Mode: u8 {
        /// Stops conversions; the registers stay readable
        const SHUTDOWN = 0x01;
        /// OS output works as an interrupt instead of a comparator
        const COMP_INT = 0x02;
        /// OS output is active high
        const OS_POLARITY = 0x04;
        /// Fault queue length, see [`FaultQueue`]
        const FAULT_QUEUE = 0x18;
    }
}

/// Number of consecutive faults needed before the OS output activates.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum FaultQueue {
    #[default]
    Samples1 = 0b00,
    Samples2 = 0b01,
    Samples4 = 0b10,
    Samples6 = 0b11,
}

const FAULT_QUEUE_SHIFT: u8 = 3;

impl FaultQueue {
    pub fn from_samples(samples: u8) -> Option<Self> {
        match samples {
            1 => Some(Self::Samples1),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            6 => Some(Self::Samples6),
            _ => None,
        }
    }

    pub fn samples(self) -> u8 {
        match self {
            Self::Samples1 => 1,
            Self::Samples2 => 2,
            Self::Samples4 => 4,
            Self::Samples6 => 6,
        }
    }
}

impl Mode {
    pub fn with_fault_queue(self, queue: FaultQueue) -> Self {
        let bits = (queue as u8) << FAULT_QUEUE_SHIFT;
        self.difference(Self::FAULT_QUEUE) | Self::from_bits_retain(bits)
    }

    pub fn fault_queue(self) -> FaultQueue {
        let bits = (self & Self::FAULT_QUEUE).bits() >> FAULT_QUEUE_SHIFT;
        // two bits wide, every value has a variant
        FaultQueue::from_u8(bits).unwrap_or_default()
    }
}

impl From<FaultQueue> for Mode {
    fn from(queue: FaultQueue) -> Self {
        Mode::empty().with_fault_queue(queue)
    }
}
