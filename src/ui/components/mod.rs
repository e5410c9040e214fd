pub mod activity_heatmap;
pub mod chart;
pub mod dashboard;
pub mod menu;
pub mod progress_bar;
pub mod quiz_view;
pub mod stats_dashboard;
