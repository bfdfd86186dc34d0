pub mod mock_ramp_server;
pub mod test_data;
