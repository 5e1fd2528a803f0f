pub mod upstream_mock;
