pub mod compose;
pub mod crop;
pub mod inter_nearest;
pub mod metrics;
pub mod padding;
pub mod summed_area_table;
pub mod trimap;
