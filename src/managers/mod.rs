pub mod thordata;
