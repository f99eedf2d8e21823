pub mod grpc_service;

pub mod proto {
    pub mod payment {
        tonic::include_proto!("payment");
    }
}
