// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use tmx::container::TmxImage;
use tmx::error::{Result, TmxError};
use tmx::pixel_format::PixelFormat;
use tmx::raster::ImageRaster;

/// Inspect and convert TMX texture containers.
#[derive(Parser)]
#[command(name = "tmxtool")]
#[command(about = "TMX texture container inspector and converter", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the header fields of a TMX file.
    Info {
        /// Path to the TMX file.
        path: String,
    },
    /// Decode a TMX file's base level to a PNG.
    Export {
        /// Path to the source TMX file.
        tmx_path: String,
        /// Path to the output PNG file.
        png_path: String,
        /// Palette to decode through, for indexed images.
        #[arg(long, default_value = "0")]
        palette: usize,
        /// Mip level to decode (-1 for the base level).
        #[arg(long, default_value = "-1")]
        mip: i32,
    },
    /// Encode a PNG into a new TMX file.
    Import {
        /// Path to the source PNG file.
        png_path: String,
        /// Path to the output TMX file.
        tmx_path: String,
        /// Target pixel format (e.g. "psmct32", "psmt8", "psmt4").
        #[arg(long)]
        format: String,
    },
}

fn parse_format(name: &str) -> Result<PixelFormat> {
    let format = match name.to_ascii_lowercase().as_str() {
        "psmct32" => PixelFormat::Psmct32,
        "psmct24" => PixelFormat::Psmct24,
        "psmct16" => PixelFormat::Psmct16,
        "psmct16s" => PixelFormat::Psmct16S,
        "psmt8" => PixelFormat::Psmt8,
        "psmt8h" => PixelFormat::Psmt8H,
        "psmt4" => PixelFormat::Psmt4,
        "psmt4hl" => PixelFormat::Psmt4HL,
        "psmt4hh" => PixelFormat::Psmt4HH,
        "psmz32" => PixelFormat::Psmz32,
        "psmz24" => PixelFormat::Psmz24,
        "psmz16" => PixelFormat::Psmz16,
        "psmz16s" => PixelFormat::Psmz16S,
        other => return Err(TmxError::UnsupportedPixelFormat(other.to_string())),
    };
    Ok(format)
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Info { path } => {
            let mut reader = BufReader::new(File::open(&path)?);
            let image = TmxImage::parse(&mut reader)?;
            println!("{path}:");
            println!("  dimensions: {}x{}", image.width(), image.height());
            println!("  pixel format: {:?}", image.pixel_format());
            println!("  palette count: {}", image.palette_count());
            println!("  mip count: {}", image.mip_count());
            println!("  comment: {:?}", image.user_comment());
        }
        Command::Export {
            tmx_path,
            png_path,
            palette,
            mip,
        } => {
            info!("decoding {tmx_path}");
            let mut reader = BufReader::new(File::open(&tmx_path)?);
            let image = TmxImage::parse(&mut reader)?;
            let raster = image.to_raster(palette, mip)?;
            raster
                .as_rgba_image()
                .save(&png_path)
                .map_err(|e| TmxError::InvalidFormat(e.to_string()))?;
            info!("wrote {png_path}");
        }
        Command::Import {
            png_path,
            tmx_path,
            format,
        } => {
            let pixel_format = parse_format(&format)?;
            info!("encoding {png_path} as {pixel_format:?}");
            let dynamic = image::open(&png_path).map_err(|e| TmxError::InvalidFormat(e.to_string()))?;
            let raster: ImageRaster = dynamic.into();
            let tmx_image = TmxImage::from_raster(&raster, pixel_format, None)?;
            let mut writer = BufWriter::new(File::create(&tmx_path)?);
            tmx_image.serialize(&mut writer)?;
            info!("wrote {tmx_path}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
