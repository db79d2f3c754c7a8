pub mod between;
pub mod boolean;
pub mod comparison;
pub mod in_list;
pub mod like;
