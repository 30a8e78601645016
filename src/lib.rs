// Library exports for meisomatic
pub mod aggregate;
pub mod cascade;
pub mod cluster_check;
pub mod cohort;
pub mod config;
pub mod coord_map;
pub mod error;
pub mod evidence;
pub mod input;
pub mod interval;
pub mod pipeline;
pub mod record;
pub mod set_filter;
pub mod site;
pub mod td_check;
