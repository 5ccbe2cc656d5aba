// 領域模型與對外介面，不依賴儲存或網路實作

pub mod draft;
pub mod model;
pub mod month;
pub mod ports;

pub use month::YearMonth;
