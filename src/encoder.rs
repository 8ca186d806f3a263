//! # WebP Encoder Module
//!
//! Questo modulo orchestra i tool esterni di libwebp che producono i file
//! WebP. Nessun encoding avviene in memoria: il lavoro sui pixel è delegato
//! a `cwebp` e `gif2webp`.
//!
//! ## Percorsi di encoding
//!
//! | Piano      | Tool      | Input                                       |
//! |------------|-----------|---------------------------------------------|
//! | `Static`   | cwebp     | png, jpeg, tiff, webp, avif                 |
//! | `Static`   | cwebp     | gif a frame singolo, bmp (via PNG temporaneo) |
//! | `Animated` | gif2webp  | gif con più frame                           |
//!
//! `cwebp` non legge GIF né BMP: queste sorgenti vengono prima decodificate
//! con il crate `image` in un PNG temporaneo, rimosso a fine encoding.
//!
//! ## Seam di test
//! Il converter dipende dal trait `ImageEncoder`, non da `WebpToolchain`:
//! i test iniettano un encoder finto che registra il piano scelto.

use crate::config::{AnimatedProfile, StaticProfile};
use crate::error::ConvertError;
use crate::format::SourceFormat;
use crate::tool_resolver::{ToolPathResolver, CWEBP, GIF2WEBP};
use futures::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Conversion route chosen for one input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodePlan {
    Static(StaticProfile),
    Animated(AnimatedProfile),
}

impl EncodePlan {
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }
}

/// One encoder invocation
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: SourceFormat,
    pub plan: EncodePlan,
}

/// Anything able to write `request.output` as WebP from `request.input`
pub trait ImageEncoder: Send + Sync {
    fn encode<'a>(&'a self, request: &'a EncodeRequest) -> BoxFuture<'a, Result<(), ConvertError>>;
}

/// Encoder backed by the libwebp command-line tools
pub struct WebpToolchain {
    cwebp: Option<PathBuf>,
    gif2webp: Option<PathBuf>,
}

impl WebpToolchain {
    /// Resolve the encoder executables once
    pub fn new(resolver: &ToolPathResolver) -> Self {
        Self {
            cwebp: resolver.resolve_tool(CWEBP),
            gif2webp: resolver.resolve_tool(GIF2WEBP),
        }
    }

    /// Log which encoders are available.
    ///
    /// Missing tools never abort the run: files that need them fail one by one.
    pub fn check_dependencies(&self) {
        info!("🔧 Checking WebP encoder dependencies...");
        for (name, path) in [(CWEBP, &self.cwebp), (GIF2WEBP, &self.gif2webp)] {
            match path {
                Some(path) => info!("  ✅ {} -> {}", name, path.display()),
                None => warn!("  ❌ {} not found (files needing it will fail)", name),
            }
        }
    }

    fn cwebp_args(profile: &StaticProfile, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            profile.quality.to_string(),
            "-m".to_string(),
            profile.method.to_string(),
        ];
        if let Some(level) = profile.near_lossless {
            args.push("-near_lossless".to_string());
            args.push(level.to_string());
        }
        if profile.sharp_yuv {
            args.push("-sharp_yuv".to_string());
        }
        args.push("-mt".to_string());
        args.push(input.to_string_lossy().into_owned());
        args.push("-o".to_string());
        args.push(output.to_string_lossy().into_owned());
        args
    }

    fn gif2webp_args(profile: &AnimatedProfile, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-q".to_string(),
            profile.quality.to_string(),
            "-m".to_string(),
            profile.method.to_string(),
        ];
        if profile.min_size {
            args.push("-min_size".to_string());
        }
        if profile.multi_threaded {
            args.push("-mt".to_string());
        }
        args.push(input.to_string_lossy().into_owned());
        args.push("-o".to_string());
        args.push(output.to_string_lossy().into_owned());
        args
    }

    async fn run_tool(tool_name: &str, tool_path: Option<&Path>, args: &[String]) -> Result<(), ConvertError> {
        let tool_path = tool_path.ok_or_else(|| ConvertError::MissingDependency(tool_name.to_string()))?;
        debug!("Running {} {:?}", tool_name, args);

        let start_time = Instant::now();
        let output = Command::new(tool_path).args(args).output().await?;
        let elapsed = start_time.elapsed();

        if output.status.success() {
            debug!("{} completed successfully in {:?}", tool_name, elapsed);
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ConvertError::Encoder(format!(
                "{} failed after {:?} ({}): {}",
                tool_name,
                elapsed,
                output.status,
                stderr.trim()
            )))
        }
    }

    /// Decode an input cwebp cannot read into a temporary PNG
    async fn decode_to_png(input: &Path) -> Result<NamedTempFile, ConvertError> {
        let input = input.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<NamedTempFile, ConvertError> {
            let image = image::open(&input)?;
            let temp = tempfile::Builder::new().suffix(".png").tempfile()?;
            image.save_with_format(temp.path(), image::ImageFormat::Png)?;
            debug!("Decoded {} to intermediate {}", input.display(), temp.path().display());
            Ok(temp)
        })
        .await
        .map_err(|e| ConvertError::Encoder(format!("decode task failed: {}", e)))?
    }

    async fn encode_static(&self, request: &EncodeRequest, profile: &StaticProfile) -> Result<(), ConvertError> {
        // Keeps the intermediate alive until cwebp has read it
        let intermediate = if request.format.cwebp_readable() {
            None
        } else {
            Some(Self::decode_to_png(&request.input).await?)
        };
        let input = intermediate
            .as_ref()
            .map(|temp| temp.path())
            .unwrap_or(request.input.as_path());

        let args = Self::cwebp_args(profile, input, &request.output);
        Self::run_tool(CWEBP, self.cwebp.as_deref(), &args).await
    }

    async fn encode_animated(&self, request: &EncodeRequest, profile: &AnimatedProfile) -> Result<(), ConvertError> {
        let args = Self::gif2webp_args(profile, &request.input, &request.output);
        Self::run_tool(GIF2WEBP, self.gif2webp.as_deref(), &args).await
    }
}

impl ImageEncoder for WebpToolchain {
    fn encode<'a>(&'a self, request: &'a EncodeRequest) -> BoxFuture<'a, Result<(), ConvertError>> {
        async move {
            match request.plan {
                EncodePlan::Static(ref profile) => self.encode_static(request, profile).await,
                EncodePlan::Animated(ref profile) => self.encode_animated(request, profile).await,
            }
        }
        .boxed()
    }
}
