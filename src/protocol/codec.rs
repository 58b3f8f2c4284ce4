use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{FabricError, Result};

/// Upper bound on a single frame. Job inputs are small; anything near this
/// size is a malformed or hostile peer.
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// Write one length-prefixed JSON frame.
pub async fn write_frame<W, T>(stream: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)
        .map_err(|e| FabricError::Protocol(format!("encoding frame: {}", e)))?;
    if body.len() > MAX_FRAME_BYTES {
        return Err(FabricError::Protocol(format!(
            "frame of {} bytes exceeds the {} byte limit",
            body.len(),
            MAX_FRAME_BYTES
        )));
    }
    stream.write_all(&(body.len() as u32).to_be_bytes()).await?;
    stream.write_all(&body).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one length-prefixed JSON frame.
///
/// A peer that closes the connection before the first byte yields
/// [`FabricError::ConnectionClosed`]; a close mid-frame or a body that does
/// not decode as `T` yields [`FabricError::Protocol`].
pub async fn read_frame<R, T>(stream: &mut R) -> Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(FabricError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(FabricError::Protocol(format!(
            "declared frame of {} bytes exceeds the {} byte limit",
            len, MAX_FRAME_BYTES
        )));
    }

    let mut body = vec![0u8; len];
    match stream.read_exact(&mut body).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(FabricError::Protocol("truncated frame".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    serde_json::from_slice(&body).map_err(|e| FabricError::Protocol(format!("decoding frame: {}", e)))
}
