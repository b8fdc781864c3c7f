//! Conversions between status values and their protobuf messages.
//!
//! Both the server and the two client paths go through these functions,
//! so a snapshot decodes the same way no matter how it was fetched.
//! Fields a newer peer appends are skipped by prost on decode.

use stratus_core::{ClusterStatusSnapshot, ServerIdentity, ServerLoad, StatusOptions};

use crate::error::DecodeError;
use crate::proto;

pub fn encode_request(options: &StatusOptions) -> proto::ClusterStatusRequest {
    proto::ClusterStatusRequest {
        include_mask: options.to_mask(),
    }
}

/// Read the requested categories. Unknown bits are dropped.
pub fn decode_request(request: &proto::ClusterStatusRequest) -> StatusOptions {
    StatusOptions::from_mask(request.include_mask)
}

pub fn encode_snapshot(snapshot: &ClusterStatusSnapshot) -> proto::ClusterStatusResponse {
    proto::ClusterStatusResponse {
        version: snapshot.version().map(str::to_string),
        cluster_id: snapshot.cluster_id().map(str::to_string),
        live_servers: snapshot
            .live_servers()
            .iter()
            .map(|(server, load)| proto::LiveServer {
                server: Some(encode_server(server)),
                load: Some(encode_load(load)),
            })
            .collect(),
        dead_servers: snapshot.dead_servers().iter().map(encode_server).collect(),
        master: snapshot.master().map(encode_server),
        backup_masters: snapshot.backup_masters().iter().map(encode_server).collect(),
        master_coprocessors: snapshot.master_coprocessors().to_vec(),
        balancer_on: snapshot.balancer_on(),
    }
}

/// Rebuild a snapshot from the wire; region totals are re-derived.
pub fn decode_snapshot(
    response: proto::ClusterStatusResponse,
) -> Result<ClusterStatusSnapshot, DecodeError> {
    let mut builder = ClusterStatusSnapshot::builder();

    if let Some(version) = response.version {
        builder = builder.version(version);
    }
    if let Some(cluster_id) = response.cluster_id {
        builder = builder.cluster_id(cluster_id);
    }

    let live = response
        .live_servers
        .into_iter()
        .map(|entry| {
            let server = entry.server.ok_or(DecodeError::MissingServerName)?;
            let load = entry.load.map(decode_load).unwrap_or_default();
            Ok((decode_server(server, "live_servers")?, load))
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;
    builder = builder.live_servers(live);

    let dead = response
        .dead_servers
        .into_iter()
        .map(|s| decode_server(s, "dead_servers"))
        .collect::<Result<Vec<_>, _>>()?;
    builder = builder.dead_servers(dead);

    if let Some(master) = response.master {
        builder = builder.master(decode_server(master, "master")?);
    }

    let backups = response
        .backup_masters
        .into_iter()
        .map(|s| decode_server(s, "backup_masters"))
        .collect::<Result<Vec<_>, _>>()?;
    builder = builder.backup_masters(backups);

    builder = builder.master_coprocessors(response.master_coprocessors);

    if let Some(on) = response.balancer_on {
        builder = builder.balancer_on(on);
    }

    Ok(builder.build())
}

fn encode_server(server: &ServerIdentity) -> proto::ServerName {
    proto::ServerName {
        host: server.host().to_string(),
        port: u32::from(server.port()),
        start_code: server.start_code(),
    }
}

fn decode_server(
    name: proto::ServerName,
    field: &'static str,
) -> Result<ServerIdentity, DecodeError> {
    let port = u16::try_from(name.port).map_err(|_| DecodeError::Identity {
        field,
        source: stratus_core::CoreError::InvalidPort(u64::from(name.port)),
    })?;
    ServerIdentity::new(name.host, port, name.start_code)
        .map_err(|source| DecodeError::Identity { field, source })
}

fn encode_load(load: &ServerLoad) -> proto::ServerLoad {
    proto::ServerLoad {
        regions: load.regions,
        requests_per_second: load.requests_per_second,
        used_heap_mb: load.used_heap_mb,
        max_heap_mb: load.max_heap_mb,
    }
}

fn decode_load(load: proto::ServerLoad) -> ServerLoad {
    ServerLoad {
        regions: load.regions,
        requests_per_second: load.requests_per_second,
        used_heap_mb: load.used_heap_mb,
        max_heap_mb: load.max_heap_mb,
    }
}
