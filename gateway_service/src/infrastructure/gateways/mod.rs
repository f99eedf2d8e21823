pub mod grpc_bank_gateway;
