//! # gRPC Adapters
//!
//! Hand-wired tonic clients for the two Fabric services the control plane
//! calls: `orderer.AtomicBroadcast` (Broadcast, Deliver) and `protos.Deliver`
//! on peers. Both are bidirectional streams of `Envelope`; each call here
//! sends one envelope and reads until the answer arrives.

mod orderer;
mod peer;

pub use orderer::{GrpcBroadcaster, GrpcConfigBlockSource};
pub use peer::GrpcLedgerReader;

use fcp_01_block_codec::proto::common::{Block, Envelope, Status};
use fcp_01_block_codec::proto::orderer::{deliver_response, DeliverResponse};
use shared_types::TransportError;
use std::time::Duration;
use tonic::client::Grpc;
use tonic::codec::{ProstCodec, Streaming};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::Request;

pub(crate) const BROADCAST_PATH: &str = "/orderer.AtomicBroadcast/Broadcast";
pub(crate) const ORDERER_DELIVER_PATH: &str = "/orderer.AtomicBroadcast/Deliver";
pub(crate) const PEER_DELIVER_PATH: &str = "/protos.Deliver/Deliver";

fn server_name(url: &str) -> &str {
    url.rsplit_once(':').map_or(url, |(host, _)| host)
}

/// Open a channel to `url` (`host:port`). TLS is used whenever a CA
/// certificate is known for the node.
pub(crate) async fn connect(
    url: &str,
    tls_ca_pem: &str,
    connect_timeout: Duration,
) -> Result<Channel, TransportError> {
    let connect_error = |e: tonic::transport::Error| TransportError::Connect {
        endpoint: url.to_string(),
        message: e.to_string(),
    };
    let endpoint = if tls_ca_pem.trim().is_empty() {
        Endpoint::from_shared(format!("http://{url}")).map_err(connect_error)?
    } else {
        let tls = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(tls_ca_pem))
            .domain_name(server_name(url));
        Endpoint::from_shared(format!("https://{url}"))
            .and_then(|e| e.tls_config(tls))
            .map_err(connect_error)?
    };
    endpoint
        .connect_timeout(connect_timeout)
        .connect()
        .await
        .map_err(connect_error)
}

pub(crate) fn status_error(endpoint: &str, status: tonic::Status) -> TransportError {
    TransportError::Rejected {
        endpoint: endpoint.to_string(),
        status: format!("{:?}", status.code()),
        info: status.message().to_string(),
    }
}

/// Send `envelope` on the bidirectional stream at `path`.
pub(crate) async fn open_stream<R>(
    channel: Channel,
    endpoint: &str,
    path: &'static str,
    envelope: Envelope,
) -> Result<Streaming<R>, TransportError>
where
    R: prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = Grpc::new(channel);
    grpc.ready().await.map_err(|e| TransportError::Connect {
        endpoint: endpoint.to_string(),
        message: format!("service was not ready: {e}"),
    })?;
    let codec: ProstCodec<Envelope, R> = ProstCodec::default();
    let request = Request::new(tokio_stream::iter(vec![envelope]));
    let response = grpc
        .streaming(request, PathAndQuery::from_static(path), codec)
        .await
        .map_err(|status| status_error(endpoint, status))?;
    Ok(response.into_inner())
}

/// Read Deliver responses until the requested block arrives.
pub(crate) async fn read_block(
    mut stream: Streaming<DeliverResponse>,
    endpoint: &str,
) -> Result<Block, TransportError> {
    while let Some(response) = stream
        .message()
        .await
        .map_err(|status| status_error(endpoint, status))?
    {
        match response.r#type {
            Some(deliver_response::Type::Block(block)) => return Ok(block),
            Some(deliver_response::Type::Status(code)) => {
                let name = Status::try_from(code)
                    .map(|s| s.as_str_name().to_string())
                    .unwrap_or_else(|_| code.to_string());
                return Err(TransportError::Rejected {
                    endpoint: endpoint.to_string(),
                    status: name,
                    info: "deliver ended without a block".to_string(),
                });
            }
            None => continue,
        }
    }
    Err(TransportError::Protocol {
        endpoint: endpoint.to_string(),
        message: "deliver stream closed before a block arrived".to_string(),
    })
}
