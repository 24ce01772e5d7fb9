use std::fmt;

use crate::{ContinuousPickupDropOff, GtfsCode, PickupDropOffType};

/// Traffic-control codes of one stop time packed into 16 bits.
///
/// | bits | field |
/// |------|-------|
/// | 0-1  | pickup type |
/// | 2-3  | drop-off type |
/// | 4-5  | continuous pickup |
/// | 6-7  | continuous drop-off |
/// | 8    | timepoint (1 = exact) |
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StopTimeFlags(u16);

const PICKUP_SHIFT: u16 = 0;
const DROP_OFF_SHIFT: u16 = 2;
const CONTINUOUS_PICKUP_SHIFT: u16 = 4;
const CONTINUOUS_DROP_OFF_SHIFT: u16 = 6;
const TIMEPOINT_SHIFT: u16 = 8;
const TWO_BITS: u16 = 0b11;

impl StopTimeFlags {
    pub fn new(
        pickup: PickupDropOffType,
        drop_off: PickupDropOffType,
        continuous_pickup: ContinuousPickupDropOff,
        continuous_drop_off: ContinuousPickupDropOff,
        timepoint: bool,
    ) -> Self {
        let mut flags = Self(0);
        flags.set_pickup(pickup);
        flags.set_drop_off(drop_off);
        flags.set_continuous_pickup(continuous_pickup);
        flags.set_continuous_drop_off(continuous_drop_off);
        flags.set_timepoint(timepoint);
        flags
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    fn field(self, shift: u16) -> i64 {
        ((self.0 >> shift) & TWO_BITS) as i64
    }

    fn set_field(&mut self, shift: u16, code: i64) {
        self.0 = (self.0 & !(TWO_BITS << shift)) | (((code as u16) & TWO_BITS) << shift);
    }

    pub fn pickup(self) -> PickupDropOffType {
        PickupDropOffType::from_code(self.field(PICKUP_SHIFT)).unwrap_or(PickupDropOffType::Regular)
    }

    pub fn set_pickup(&mut self, value: PickupDropOffType) {
        self.set_field(PICKUP_SHIFT, value.code());
    }

    pub fn drop_off(self) -> PickupDropOffType {
        PickupDropOffType::from_code(self.field(DROP_OFF_SHIFT))
            .unwrap_or(PickupDropOffType::Regular)
    }

    pub fn set_drop_off(&mut self, value: PickupDropOffType) {
        self.set_field(DROP_OFF_SHIFT, value.code());
    }

    pub fn continuous_pickup(self) -> ContinuousPickupDropOff {
        ContinuousPickupDropOff::from_code(self.field(CONTINUOUS_PICKUP_SHIFT))
            .unwrap_or(ContinuousPickupDropOff::NoContinuous)
    }

    pub fn set_continuous_pickup(&mut self, value: ContinuousPickupDropOff) {
        self.set_field(CONTINUOUS_PICKUP_SHIFT, value.code());
    }

    pub fn continuous_drop_off(self) -> ContinuousPickupDropOff {
        ContinuousPickupDropOff::from_code(self.field(CONTINUOUS_DROP_OFF_SHIFT))
            .unwrap_or(ContinuousPickupDropOff::NoContinuous)
    }

    pub fn set_continuous_drop_off(&mut self, value: ContinuousPickupDropOff) {
        self.set_field(CONTINUOUS_DROP_OFF_SHIFT, value.code());
    }

    pub fn timepoint(self) -> bool {
        self.0 & (1 << TIMEPOINT_SHIFT) != 0
    }

    pub fn set_timepoint(&mut self, exact: bool) {
        if exact {
            self.0 |= 1 << TIMEPOINT_SHIFT;
        } else {
            self.0 &= !(1 << TIMEPOINT_SHIFT);
        }
    }
}

impl Default for StopTimeFlags {
    fn default() -> Self {
        Self::new(
            PickupDropOffType::Regular,
            PickupDropOffType::Regular,
            ContinuousPickupDropOff::NoContinuous,
            ContinuousPickupDropOff::NoContinuous,
            true,
        )
    }
}

impl fmt::Debug for StopTimeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopTimeFlags")
            .field("pickup", &self.pickup())
            .field("drop_off", &self.drop_off())
            .field("continuous_pickup", &self.continuous_pickup())
            .field("continuous_drop_off", &self.continuous_drop_off())
            .field("timepoint", &self.timepoint())
            .finish()
    }
}
