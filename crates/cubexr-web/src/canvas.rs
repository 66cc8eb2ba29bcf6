//! 2D canvas renderer - wireframe boxes, with the video frame underneath when
//! the material is a video texture

use cubexr_scene::{BoxGeometry, Mesh, PerspectiveCamera, RenderBackend, Scene, SceneError, Vec2};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlVideoElement};

const LINE_WIDTH: f64 = 2.0;

pub struct CanvasRenderer {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    context: Option<CanvasRenderingContext2d>,
    video: Option<HtmlVideoElement>,
    width: f32,
    height: f32,
}

impl CanvasRenderer {
    pub fn new(
        container: HtmlElement,
        canvas: HtmlCanvasElement,
        video: Option<HtmlVideoElement>,
    ) -> Self {
        Self {
            container,
            canvas,
            context: None,
            video,
            width: 0.0,
            height: 0.0,
        }
    }

    fn draw_mesh(&self, context: &CanvasRenderingContext2d, mesh: &Mesh, camera: &PerspectiveCamera) {
        let projected: Vec<Option<Vec2>> = mesh
            .world_corners()
            .iter()
            .map(|&corner| camera.project_to_viewport(corner, self.width, self.height))
            .collect();

        if let (Some(video), Some(_)) = (&self.video, mesh.material.video_texture()) {
            let visible: Vec<Vec2> = projected.iter().flatten().copied().collect();
            if let Some((min, max)) = bounding_box(&visible) {
                let size = max - min;
                let _ = context.draw_image_with_html_video_element_and_dw_and_dh(
                    video,
                    min.x as f64,
                    min.y as f64,
                    size.x as f64,
                    size.y as f64,
                );
            }
        }

        context.set_stroke_style_str(&mesh.material.css_color());
        context.set_line_width(LINE_WIDTH);
        context.begin_path();
        for (a, b) in BoxGeometry::EDGES {
            if let (Some(start), Some(end)) = (projected[a], projected[b]) {
                context.move_to(start.x as f64, start.y as f64);
                context.line_to(end.x as f64, end.y as f64);
            }
        }
        context.stroke();
    }
}

fn bounding_box(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
    )
}

fn backend_error(e: wasm_bindgen::JsValue) -> SceneError {
    SceneError::Backend(format!("{e:?}"))
}

impl RenderBackend for CanvasRenderer {
    fn attach(&mut self) -> Result<(), SceneError> {
        let context = self
            .canvas
            .get_context("2d")
            .map_err(backend_error)?
            .ok_or_else(|| SceneError::Backend("2d canvas context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SceneError::Backend("unexpected canvas context type".to_string()))?;

        let _ = self.canvas.style().set_property("display", "block");
        self.container
            .append_child(&self.canvas)
            .map_err(backend_error)?;
        self.context = Some(context);
        Ok(())
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{width}px"));
        let _ = style.set_property("height", &format!("{height}px"));
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let Some(context) = &self.context else {
            return;
        };
        context.clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
        for (_, mesh) in scene.visible_meshes() {
            self.draw_mesh(context, mesh, camera);
        }
    }

    fn dispose(&mut self) {
        self.context = None;
        self.canvas.remove();
    }
}
