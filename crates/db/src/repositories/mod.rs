//! Repositories for database operations.

pub mod bag_piece;
pub mod bag_set;
pub mod flight;
pub mod notification;
pub mod passenger;
pub mod scan_log;

pub use bag_piece::BagPieceRepository;
pub use bag_set::BagSetRepository;
pub use flight::FlightRepository;
pub use notification::NotificationRepository;
pub use passenger::PassengerRepository;
pub use scan_log::ScanLogRepository;
