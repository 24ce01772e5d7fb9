use serde::Serialize;

/// Enumerations stored in the feed as small integer codes.
pub trait GtfsCode: Sized + Copy {
    fn from_code(code: i64) -> Option<Self>;
    fn code(self) -> i64;
}

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant),+
        }

        impl GtfsCode for $name {
            fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }
    };
}

code_enum! {
    /// Role of a stop, which constrains what its parent may be.
    pub enum LocationType {
        StopOrPlatform = 0,
        Station = 1,
        EntranceOrExit = 2,
        GenericNode = 3,
        BoardingArea = 4,
    }
}

impl Default for LocationType {
    fn default() -> Self {
        LocationType::StopOrPlatform
    }
}

impl LocationType {
    /// Location type a parent of `self` must have, if a parent is allowed at all.
    pub fn required_parent(self) -> Option<LocationType> {
        match self {
            LocationType::StopOrPlatform
            | LocationType::EntranceOrExit
            | LocationType::GenericNode => Some(LocationType::Station),
            LocationType::BoardingArea => Some(LocationType::StopOrPlatform),
            LocationType::Station => None,
        }
    }

    pub fn requires_coordinates(self) -> bool {
        matches!(
            self,
            LocationType::StopOrPlatform | LocationType::Station | LocationType::EntranceOrExit
        )
    }
}

code_enum! {
    pub enum WheelchairBoarding {
        NoInfo = 0,
        Some = 1,
        NotPossible = 2,
    }
}

code_enum! {
    pub enum PickupDropOffType {
        Regular = 0,
        NoPickup = 1,
        MustPhone = 2,
        MustCoordinateWithDriver = 3,
    }
}

code_enum! {
    pub enum ContinuousPickupDropOff {
        Continuous = 0,
        NoContinuous = 1,
        MustPhone = 2,
        MustCoordinateWithDriver = 3,
    }
}

code_enum! {
    pub enum DirectionId {
        Direction0 = 0,
        Direction1 = 1,
    }
}

code_enum! {
    pub enum WheelchairAccessible {
        NoInfo = 0,
        Accessible = 1,
        NotAccessible = 2,
    }
}

code_enum! {
    pub enum BikesAllowed {
        NoInfo = 0,
        Allowed = 1,
        NotAllowed = 2,
    }
}

code_enum! {
    pub enum ExceptionType {
        Added = 1,
        Removed = 2,
    }
}

code_enum! {
    pub enum PaymentMethod {
        OnBoard = 0,
        BeforeBoarding = 1,
    }
}

code_enum! {
    pub enum TransferType {
        Recommended = 0,
        Timed = 1,
        MinTime = 2,
        NoTransfer = 3,
        InSeat = 4,
        InSeatNotAllowed = 5,
    }
}

impl TransferType {
    pub fn is_in_seat(self) -> bool {
        matches!(self, TransferType::InSeat | TransferType::InSeatNotAllowed)
    }
}

code_enum! {
    pub enum PathwayMode {
        Walkway = 1,
        Stairs = 2,
        MovingSidewalk = 3,
        Escalator = 4,
        Elevator = 5,
        FareGate = 6,
        ExitGate = 7,
    }
}

/// Transport mode of a route: the basic codes plus the extended
/// hierarchical vehicle types (100..=1702).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RouteType {
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    Trolleybus,
    Monorail,
    Extended(u16),
}

impl RouteType {
    /// Maps extended vehicle types onto the basic code set. Extended codes
    /// without a basic counterpart (air, taxi, miscellaneous) are returned as is.
    pub fn normalized(self) -> RouteType {
        let RouteType::Extended(code) = self else {
            return self;
        };
        match code / 100 {
            1 => RouteType::Rail,
            2 | 7 => RouteType::Bus,
            4 if code == 405 => RouteType::Monorail,
            4 => RouteType::Subway,
            8 => RouteType::Trolleybus,
            9 => RouteType::Tram,
            10 | 12 => RouteType::Ferry,
            13 => RouteType::Gondola,
            14 => RouteType::Funicular,
            _ => self,
        }
    }
}

impl GtfsCode for RouteType {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RouteType::Tram),
            1 => Some(RouteType::Subway),
            2 => Some(RouteType::Rail),
            3 => Some(RouteType::Bus),
            4 => Some(RouteType::Ferry),
            5 => Some(RouteType::CableCar),
            6 => Some(RouteType::Gondola),
            7 => Some(RouteType::Funicular),
            11 => Some(RouteType::Trolleybus),
            12 => Some(RouteType::Monorail),
            100..=1702 => Some(RouteType::Extended(code as u16)),
            _ => None,
        }
    }

    fn code(self) -> i64 {
        match self {
            RouteType::Tram => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableCar => 5,
            RouteType::Gondola => 6,
            RouteType::Funicular => 7,
            RouteType::Trolleybus => 11,
            RouteType::Monorail => 12,
            RouteType::Extended(code) => code as i64,
        }
    }
}
