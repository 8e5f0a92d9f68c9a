pub mod chart;
pub mod controls;
pub mod genre_sidebar;
pub mod text_input;
pub mod text_input_common;
