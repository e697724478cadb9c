pub mod mock_mcp;
