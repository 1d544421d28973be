// RustPixel
// copyright zipxing@hotmail.com 2022～2025

/// shape-view renders one shape of a shape segment to a png file.
///
/// Usage:
/// shape-view polygons.bin --offset 0x1A40 --x 160 --y 100
/// shape-view polygons.bin --offset 0x1A40 --palette palettes.bin --pal-num 3
/// shape-view shapes.3do --config 3do.toml --zoom 128 --out ship.png
///
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::info;
use pixel_vector::init::{get_render_config, init_render_config, load_render_config};
use pixel_vector::log::init_log;
use pixel_vector::render::{
    FrameCapture, MemorySurface, PageRef, PaletteBank, PngCapture, Video,
};
use pixel_vector::util::PointI16;
use std::fs;
use std::process::exit;
use std::rc::Rc;

fn parse_offset(s: &str) -> Result<usize, String> {
    let r = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    r.map_err(|e| format!("bad offset '{}': {}", s, e))
}

fn make_parser() -> ArgMatches {
    Command::new("shape-view")
        .author("zipxing@hotmail.com")
        .about("Render one vector shape to a png file")
        .arg(Arg::new("shapes").required(true).help("shape segment file"))
        .arg(
            Arg::new("offset")
                .long("offset")
                .default_value("0")
                .value_parser(parse_offset),
        )
        .arg(
            Arg::new("x")
                .long("x")
                .default_value("160")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i16)),
        )
        .arg(
            Arg::new("y")
                .long("y")
                .default_value("100")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i16)),
        )
        .arg(
            Arg::new("zoom")
                .long("zoom")
                .default_value("64")
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .default_value("255")
                .value_parser(value_parser!(u8)),
        )
        .arg(Arg::new("palette").long("palette").help("palette segment file"))
        .arg(
            Arg::new("pal_num")
                .long("pal-num")
                .default_value("0")
                .value_parser(value_parser!(u8)),
        )
        .arg(Arg::new("config").long("config").help("render config toml"))
        .arg(Arg::new("out").long("out").default_value("."))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue),
        )
        .get_matches()
}

fn run(args: &ArgMatches) -> Result<(), String> {
    if let Some(path) = args.get_one::<String>("config") {
        init_render_config(load_render_config(path)?);
    }
    let cfg = get_render_config();
    let level = if args.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        cfg.level_filter()
    };
    init_log(level, None)?;

    let shapes_path = args.get_one::<String>("shapes").ok_or("missing shapes")?;
    let shapes = fs::read(shapes_path).map_err(|e| format!("{}: {}", shapes_path, e))?;
    let offset = *args.get_one::<usize>("offset").unwrap_or(&0);
    if offset >= shapes.len() {
        return Err(format!("offset 0x{:X} beyond {} bytes", offset, shapes.len()));
    }

    let mut video = Video::new(cfg);
    if let Some(path) = args.get_one::<String>("palette") {
        let data = fs::read(path).map_err(|e| format!("{}: {}", path, e))?;
        video.set_palettes(PaletteBank::new(Rc::from(data), cfg.palette_format));
        video.change_palette(*args.get_one::<u8>("pal_num").unwrap_or(&0));
    }

    let out = args.get_one::<String>("out").map(String::as_str).unwrap_or(".");
    let mut capture = PngCapture::new(out);
    let pt = PointI16::new(
        *args.get_one::<i16>("x").unwrap_or(&160),
        *args.get_one::<i16>("y").unwrap_or(&100),
    );
    let zoom = *args.get_one::<u16>("zoom").unwrap_or(&64);
    let color = *args.get_one::<u8>("color").unwrap_or(&0xFF);

    video.set_data_buffer(Rc::from(shapes), offset);
    video.select_draw_page(PageRef::Rendering);
    video.fill_page(PageRef::Rendering, 0);
    video.draw_shape(color, zoom, pt);

    let mut surface = MemorySurface::new();
    video.present(PageRef::Rendering, &mut surface);
    let frame = video.get_pixels(PageRef::Displayed);
    capture.capture(&frame, 1).map_err(|e| e.to_string())?;
    info!("shape 0x{:X} written to {}", offset, capture.path(1).display());
    Ok(())
}

fn main() {
    let args = make_parser();
    if let Err(e) = run(&args) {
        eprintln!("shape-view: {}", e);
        exit(1);
    }
}
