//! Display colours attached to grades, pillars and SAGI labels.

pub const PINK: &str = "#E96BB0";
pub const SKY: &str = "#0EA5E9";
pub const NAVY: &str = "#323E48";
pub const PURPLE: &str = "#8B5CF6";
pub const GREEN: &str = "#10B981";
pub const ORANGE: &str = "#FF6B35";
pub const BLUE: &str = "#0075C9";
pub const AMBER: &str = "#F59E0B";
pub const GREY_400: &str = "#9CA3AF";
pub const GREY_600: &str = "#4A4A6A";
