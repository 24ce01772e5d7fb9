use std::collections::BTreeMap;

use crate::index::Identified;
use crate::{
    BikesAllowed, ContinuousPickupDropOff, DirectionId, ExceptionType, GtfsColor, GtfsDate,
    GtfsTime, Id, Idx, LocationType, PathwayMode, PaymentMethod, RouteType, StopTimeFlags,
    TransferType, WheelchairAccessible, WheelchairBoarding,
};

macro_rules! identified {
    ($($entity:ty),+ $(,)?) => {
        $(impl Identified for $entity {
            fn id(&self) -> &str {
                self.id.as_str()
            }
        })+
    };
}

identified!(Agency, Level, Stop, Shape, Route, Service, Trip, FareAttribute, Pathway);

#[derive(Debug, Clone, Default)]
pub struct Agency {
    /// Empty when the feed has a single agency that omits `agency_id`.
    pub id: Id,
    pub name: String,
    pub url: String,
    pub timezone: String,
    pub lang: Option<String>,
    pub phone: Option<String>,
    pub fare_url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedInfo {
    pub publisher_name: String,
    pub publisher_url: String,
    pub lang: String,
    pub default_lang: Option<String>,
    pub start_date: Option<GtfsDate>,
    pub end_date: Option<GtfsDate>,
    pub version: Option<String>,
    pub contact_email: Option<String>,
    pub contact_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Level {
    pub id: Id,
    pub index: f64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stop {
    pub id: Id,
    pub code: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    /// `None` stands for the NaN pair of a location without coordinates.
    pub coordinates: Option<Coordinates>,
    pub zone_id: Option<Id>,
    pub url: Option<String>,
    pub location_type: LocationType,
    /// Raw `parent_station` value, kept until the parent pass resolves it.
    pub parent_station: Option<Id>,
    pub parent: Option<Idx<Stop>>,
    pub timezone: Option<String>,
    pub wheelchair_boarding: Option<WheelchairBoarding>,
    pub level: Option<Idx<Level>>,
    pub platform_code: Option<String>,
}

impl Stop {
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapePoint {
    pub lat: f64,
    pub lon: f64,
    pub sequence: u32,
    pub dist_traveled: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub id: Id,
    pub points: Vec<ShapePoint>,
}

impl Shape {
    pub fn with_capacity(id: Id, capacity: usize) -> Self {
        Self {
            id,
            points: Vec::with_capacity(capacity),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub id: Id,
    pub agency: Option<Idx<Agency>>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub desc: Option<String>,
    pub route_type: RouteType,
    pub url: Option<String>,
    pub color: GtfsColor,
    pub text_color: GtfsColor,
    pub sort_order: Option<u32>,
    pub continuous_pickup: ContinuousPickupDropOff,
    pub continuous_drop_off: ContinuousPickupDropOff,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            id: Id::default(),
            agency: None,
            short_name: None,
            long_name: None,
            desc: None,
            route_type: RouteType::Bus,
            url: None,
            color: GtfsColor::WHITE,
            text_color: GtfsColor::BLACK,
            sort_order: None,
            continuous_pickup: ContinuousPickupDropOff::NoContinuous,
            continuous_drop_off: ContinuousPickupDropOff::NoContinuous,
        }
    }
}

/// Calendar of a service: weekly pattern over a date range plus dated exceptions.
#[derive(Debug, Clone, Default)]
pub struct Service {
    pub id: Id,
    /// Bit 0 is Monday, bit 6 is Sunday.
    pub weekdays: u8,
    pub start_date: Option<GtfsDate>,
    pub end_date: Option<GtfsDate>,
    pub exceptions: BTreeMap<GtfsDate, ExceptionType>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopTime {
    pub arrival_time: Option<GtfsTime>,
    pub departure_time: Option<GtfsTime>,
    pub stop: Idx<Stop>,
    pub sequence: u32,
    pub flags: StopTimeFlags,
    pub shape_dist_traveled: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    pub start_time: GtfsTime,
    pub end_time: GtfsTime,
    pub headway_secs: u32,
    pub exact_times: bool,
}

#[derive(Debug, Clone)]
pub struct Trip {
    pub id: Id,
    pub route: Idx<Route>,
    pub service: Idx<Service>,
    pub shape: Option<Idx<Shape>>,
    pub headsign: Option<String>,
    pub short_name: Option<String>,
    pub direction_id: Option<DirectionId>,
    pub block_id: Option<Id>,
    pub wheelchair_accessible: Option<WheelchairAccessible>,
    pub bikes_allowed: Option<BikesAllowed>,
    /// Ordered by `sequence` once the stop-times table has been read.
    pub stop_times: Vec<StopTime>,
    pub frequencies: Vec<Frequency>,
}

impl Trip {
    pub fn new(id: Id, route: Idx<Route>, service: Idx<Service>) -> Self {
        Self {
            id,
            route,
            service,
            shape: None,
            headsign: None,
            short_name: None,
            direction_id: None,
            block_id: None,
            wheelchair_accessible: None,
            bikes_allowed: None,
            stop_times: Vec::new(),
            frequencies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareRule {
    pub route: Option<Idx<Route>>,
    pub origin_id: Option<Id>,
    pub destination_id: Option<Id>,
    pub contains_id: Option<Id>,
}

#[derive(Debug, Clone)]
pub struct FareAttribute {
    pub id: Id,
    pub price: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    /// `None` means unlimited transfers.
    pub transfers: Option<u8>,
    pub agency: Option<Idx<Agency>>,
    pub transfer_duration: Option<u32>,
    pub rules: Vec<FareRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transfer {
    pub from_stop: Option<Idx<Stop>>,
    pub to_stop: Option<Idx<Stop>>,
    pub from_route: Option<Idx<Route>>,
    pub to_route: Option<Idx<Route>>,
    pub from_trip: Option<Idx<Trip>>,
    pub to_trip: Option<Idx<Trip>>,
    pub transfer_type: TransferType,
    pub min_transfer_time: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Pathway {
    pub id: Id,
    pub from_stop: Idx<Stop>,
    pub to_stop: Idx<Stop>,
    pub mode: PathwayMode,
    pub is_bidirectional: bool,
    pub length: Option<f64>,
    pub traversal_time: Option<u32>,
    pub stair_count: Option<i32>,
    pub max_slope: Option<f64>,
    pub min_width: Option<f64>,
    pub signposted_as: Option<String>,
    pub reversed_signposted_as: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Attribution {
    pub id: Option<Id>,
    pub agency: Option<Idx<Agency>>,
    pub route: Option<Idx<Route>>,
    pub trip: Option<Idx<Trip>>,
    pub organization_name: String,
    pub is_producer: bool,
    pub is_operator: bool,
    pub is_authority: bool,
    pub url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub table_name: String,
    pub field_name: String,
    pub language: String,
    pub translation: String,
    pub record_id: Option<String>,
    pub record_sub_id: Option<String>,
    pub field_value: Option<String>,
}
