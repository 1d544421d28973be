use pixel_vector::init::RenderConfig;
use pixel_vector::render::{
    Frame, FrameCapture, MemorySurface, PageRef, PaletteBank, PaletteFormat, Result, ShapeFormat,
    Video,
};
use pixel_vector::util::PointI16;
use std::cell::RefCell;
use std::rc::Rc;

/// 4x2 box leaf in embedded colour 5
const BOX: [u8; 12] = [0xC5, 4, 2, 4, 4, 0, 4, 2, 0, 2, 0, 0];

/// Capture double that records what would have been written
struct TestCapture {
    shots: Rc<RefCell<Vec<String>>>,
}

impl TestCapture {
    fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
        let shots = Rc::new(RefCell::new(Vec::new()));
        (Self { shots: shots.clone() }, shots)
    }
}

impl FrameCapture for TestCapture {
    fn capture(&mut self, frame: &Frame, num: u32) -> Result<()> {
        self.shots
            .borrow_mut()
            .push(format!("SHOT({}, {}x{})", num, frame.width, frame.height));
        Ok(())
    }
}

fn count(video: &Video, page: usize, value: u8) -> usize {
    video.gfx.pages.page(page).iter().filter(|&&b| b == value).count()
}

#[test]
fn composite_of_one_child_matches_the_leaf() {
    // group with one child at word 4 (byte 8), no offsets
    let mut data = vec![0x02, 0, 0, 0, 0x00, 0x04, 0, 0];
    data.extend_from_slice(&BOX);
    let mut video = Video::new(&RenderConfig::default());
    video.set_data_buffer(Rc::from(data), 0);

    video.select_draw_page(PageRef::Page0);
    video.draw_shape(0xFF, 64, PointI16::new(100, 50));
    video.set_shape_offset(8);
    video.select_draw_page(PageRef::Page1);
    video.draw_shape(0xFF, 64, PointI16::new(100, 50));

    assert_eq!(count(&video, 0, 5), 10);
    assert_eq!(video.gfx.pages.page(0), video.gfx.pages.page(1));
}

#[test]
fn palette_switch_is_deferred_to_present() {
    let mut pals = vec![0u8; 64];
    // palette 0 entry 5 red, palette 1 entry 5 blue
    pals[10] = 0x0F;
    pals[43] = 0x0F;
    let mut video = Video::new(&RenderConfig::default());
    video.set_palettes(PaletteBank::new(Rc::from(pals), PaletteFormat::Amiga));
    video.fill_page(PageRef::Displayed, 5);

    let mut surface = MemorySurface::new();
    video.change_palette(0);
    video.present(PageRef::Displayed, &mut surface);
    assert_eq!(surface.pixel(0, 0), Some([0xFF, 0, 0]));

    video.change_palette(1);
    assert_eq!(video.current_palette(), Some(0));
    video.present(PageRef::Displayed, &mut surface);
    assert_eq!(video.current_palette(), Some(1));
    assert_eq!(surface.pixel(319, 199), Some([0, 0, 0xFF]));
}

#[test]
fn presenting_the_rendering_page_swaps_buffers() {
    let mut video = Video::new(&RenderConfig::default());
    video.set_palette_color(3, 10, 20, 30);
    video.select_draw_page(PageRef::Rendering);
    assert_eq!(video.draw_page(), 1);
    video.fill_page(PageRef::Rendering, 3);

    let mut surface = MemorySurface::new();
    video.present(PageRef::Rendering, &mut surface);
    assert_eq!(video.displayed_page(), 1);
    assert_eq!(video.rendering_page(), 2);
    assert_eq!((surface.width, surface.height), (320, 200));
    assert_eq!(surface.pixel(5, 5), Some([10, 20, 30]));
}

#[test]
fn capture_fires_once_per_request() {
    let (capture, shots) = TestCapture::new();
    let mut video = Video::new(&RenderConfig::default());
    video.set_capture(Box::new(capture));
    let mut surface = MemorySurface::new();

    video.capture_display();
    video.present(PageRef::Displayed, &mut surface);
    video.present(PageRef::Displayed, &mut surface);
    assert_eq!(*shots.borrow(), vec!["SHOT(1, 320x200)"]);

    video.capture_display();
    video.present(PageRef::Rendering, &mut surface);
    assert_eq!(*shots.borrow(), vec!["SHOT(1, 320x200)", "SHOT(2, 320x200)"]);
    assert_eq!(surface.presented, 3);
}

#[test]
fn three_do_rect_fills_its_box() {
    let cfg = RenderConfig {
        shape_format: ShapeFormat::ThreeDo,
        ..Default::default()
    };
    let mut video = Video::new(&cfg);
    video.set_data_buffer(Rc::from(vec![0x25u8, 4, 2]), 0);
    video.draw_shape(0xFF, 64, PointI16::new(10, 20));
    let page = video.draw_page();
    assert_eq!(count(&video, page, 5), 10);
    assert_eq!(video.gfx.pages.page(page)[19 * 320 + 8], 5);
    assert_eq!(video.gfx.pages.page(page)[21 * 320 + 8], 0);
}

#[test]
fn odd_vertex_count_leaves_the_page_untouched() {
    let mut data = vec![0xC5, 4, 2, 3, 0, 0, 0, 0, 0, 0];
    data.extend_from_slice(&BOX);
    let mut video = Video::new(&RenderConfig::default());
    video.set_data_buffer(Rc::from(data), 0);
    let page = video.draw_page();

    video.draw_shape(0xFF, 64, PointI16::new(10, 20));
    assert!(video.gfx.pages.page(page).iter().all(|&b| b == 0));

    // the next command is unaffected
    video.set_shape_offset(10);
    video.draw_shape(0xFF, 64, PointI16::new(10, 20));
    assert_eq!(count(&video, page, 5), 10);
}

#[test]
fn larger_pages_scale_design_coordinates() {
    let cfg = RenderConfig {
        width: 640,
        height: 400,
        ..Default::default()
    };
    let mut video = Video::new(&cfg);
    video.set_data_buffer(Rc::from(BOX.to_vec()), 0);
    video.draw_shape(0xFF, 64, PointI16::new(10, 20));
    let page = video.draw_page();
    assert_eq!(count(&video, page, 5), 36);
    assert_eq!(video.gfx.pages.page(page)[38 * 640 + 16], 5);
}

#[test]
fn missing_shape_data_is_ignored() {
    let mut video = Video::new(&RenderConfig::default());
    video.draw_shape(0xFF, 64, PointI16::new(10, 20));
    video.copy_page_raw(0x10, 0x20, 0);
    let mut surface = MemorySurface::new();
    video.present(PageRef::Displayed, &mut surface);
    assert_eq!(surface.presented, 1);
}
