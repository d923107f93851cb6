pub mod dataset_loader;
pub mod mock_data;
pub mod tabular;
