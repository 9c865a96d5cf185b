mod adalight;

pub use adalight::{adalight_header, build_adalight_frame, HeaderMode, HEADER_LEN, MAX_COUNTED_LEDS};
