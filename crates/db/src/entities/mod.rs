//! Database entities.

pub mod bag_piece;
pub mod bag_set;
pub mod flight;
pub mod notification;
pub mod passenger;
pub mod scan_log;

pub use bag_piece::Entity as BagPiece;
pub use bag_set::Entity as BagSet;
pub use flight::Entity as Flight;
pub use notification::Entity as Notification;
pub use passenger::Entity as Passenger;
pub use scan_log::Entity as ScanLog;
