pub mod browser_mapper;
