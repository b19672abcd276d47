pub mod calendar;
pub mod stylist;
pub mod vision;
pub mod weather;

pub use calendar::CalendarClient;
pub use stylist::Stylist;
pub use vision::VisionClassifier;
pub use weather::WeatherClient;
