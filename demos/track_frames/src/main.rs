use argh::FromArgs;
use serde::Serialize;
use std::path::{Path, PathBuf};

use featrack::config::{PARAMETERS, PARAMETER_PAGE};
use featrack::host::ScriptChannels;
use featrack::image::normalize_frame;
use featrack::TrackerParams;
use featrack_io::png::{read_frame_png, write_image_png_gray8};

#[derive(FromArgs)]
/// Detect good features on the first PNG frame and optionally track them over the next ones
struct Args {
    /// path to a JSON file with the tracker parameters
    #[argh(option, short = 'p')]
    params: Option<PathBuf>,

    /// number of features to detect
    #[argh(option, short = 'n')]
    features: Option<i64>,

    /// minimum quality level of the detected corners
    #[argh(option, short = 'q')]
    quality: Option<f64>,

    /// minimum distance between features, in pixels
    #[argh(option, short = 'd')]
    distance: Option<f64>,

    /// use harris corner detection
    #[argh(switch)]
    harris: bool,

    /// track the features of the first frame instead of detecting on every frame
    #[argh(switch, short = 't')]
    track: bool,

    /// directory where the normalized gray frames are written
    #[argh(option)]
    dump_gray: Option<PathBuf>,

    /// print the parameter descriptors as JSON and exit
    #[argh(switch)]
    describe: bool,

    /// the PNG frames, in order
    #[argh(positional)]
    frames: Vec<PathBuf>,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: usize,
    path: &'a Path,
    count: usize,
    tx: &'a [f32],
    ty: &'a [f32],
}

#[derive(Serialize)]
struct ParameterPage {
    page: &'static str,
    parameters: &'static [featrack::config::ParamSpec],
}

fn load_params(args: &Args) -> Result<TrackerParams, Box<dyn std::error::Error>> {
    let mut params = match &args.params {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => TrackerParams::default(),
    };

    if let Some(features) = args.features {
        params.features = features;
    }
    if let Some(quality) = args.quality {
        params.quality = quality;
    }
    if let Some(distance) = args.distance {
        params.distance = distance;
    }
    params.use_harris |= args.harris;

    Ok(params)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.describe {
        let page = ParameterPage {
            page: PARAMETER_PAGE,
            parameters: &PARAMETERS,
        };
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if args.frames.is_empty() {
        return Err("no input frames".into());
    }

    let mut params = load_params(&args)?;
    params.find_features = true;
    log::info!("tracker parameters: {params:?}");

    if let Some(dir) = &args.dump_gray {
        std::fs::create_dir_all(dir)?;
    }

    let mut node = ScriptChannels::new(params);
    let mut previous = None;

    for (index, path) in args.frames.iter().enumerate() {
        let frame = read_frame_png(path)?;
        log::debug!(
            "frame {index}: {} with {} channels",
            frame.size(),
            frame.num_channels()
        );

        if let Some(dir) = &args.dump_gray {
            let gray_path = dir.join(format!("gray_{index:04}.png"));
            write_image_png_gray8(&gray_path, &normalize_frame(&frame)?)?;
            log::info!("frame {index}: wrote {}", gray_path.display());
        }

        let count = node.cook(Some(&frame), previous.as_ref())?;
        if count == 0 {
            log::warn!("frame {index}: no features");
        }

        let record = FrameRecord {
            frame: index,
            path,
            count,
            tx: node.tx(),
            ty: node.ty(),
        };
        println!("{}", serde_json::to_string(&record)?);

        // after the first cook, follow the features instead of detecting again
        if args.track {
            node.params_mut().find_features = false;
        }
        previous = Some(frame);
    }

    Ok(())
}
