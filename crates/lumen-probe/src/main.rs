use anyhow::{Context, Result};
use lumen_renderer::backend::{
    Backend, BufferKind, BufferUsage, Call, ClearFlags, PrimitiveMode, RecordingBackend, TextureId,
};
use lumen_renderer::coords::{ColorRgba, Matrix4, Rect};
use lumen_renderer::logging::{init_logging, LoggingConfig};
use lumen_renderer::matrix::MatrixKind;
use lumen_renderer::renderer::DEBUG_SHADER_NAME;
use lumen_renderer::resources::{
    IndexBuffer, RenderTarget, Texture, VertexBuffer, VertexComponent, VertexLayout,
};
use lumen_renderer::textures::{SamplerFilter, TextureSampler};
use lumen_renderer::{Renderer, RendererConfig};

/// Interleaved position + color, as uploaded to the vertex buffer.
const TRIANGLE: [f32; 15] = [
    0.0, 0.5, /**/ 1.0, 0.0, 0.0, //
    -0.5, -0.5, /**/ 0.0, 1.0, 0.0, //
    0.5, -0.5, /**/ 0.0, 0.0, 1.0, //
];

const INDICES: [u16; 3] = [0, 1, 2];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut renderer = Renderer::new(RecordingBackend::new(), RendererConfig::default());
    renderer.initialize().context("renderer setup failed")?;

    let frame = run_frame(&mut renderer);
    renderer.uninitialize();
    frame?;

    print_trace(renderer.backend().calls());
    Ok(())
}

/// Clears the window, then draws an indexed triangle with the debug shader,
/// twice, so the second draw shows what the caches save.
fn run_frame(renderer: &mut Renderer<RecordingBackend>) -> Result<()> {
    let context = renderer
        .backend()
        .current_context()
        .context("recording backend has no context")?;
    let window = renderer.register(RenderTarget::window(context, 1280, 720));
    let shader = renderer
        .shader_by_name(DEBUG_SHADER_NAME)
        .context("debug shader missing")?;

    let layout = renderer.register(VertexLayout::new(&[
        (VertexComponent::Position, wgpu::VertexFormat::Float32x2),
        (VertexComponent::Color, wgpu::VertexFormat::Float32x3),
    ]));
    let vertices = upload(renderer, BufferKind::Vertex, bytemuck::cast_slice(&TRIANGLE))?;
    let vertices = renderer.register(VertexBuffer::new(vertices, layout, 3));
    let indices = upload(renderer, BufferKind::Index, bytemuck::cast_slice(&INDICES))?;
    let indices = renderer.register(IndexBuffer::new(indices, 3, false));
    let texture = renderer.register(Texture::new_2d(TextureId(1), 256, 256).with_mipmaps(true));

    renderer.set_target(Some(window))?;
    renderer.set_viewport(Rect::from_size(1280, 720));
    renderer.set_clear_color(ColorRgba::from_rgba8(24, 24, 32, 255));
    renderer.clear(ClearFlags::COLOR | ClearFlags::DEPTH)?;

    renderer.set_shader(Some(shader))?;
    renderer.set_vertex_buffer(Some(vertices))?;
    renderer.set_index_buffer(Some(indices))?;
    renderer.set_texture(0, Some(texture))?;
    renderer.set_texture_sampler(
        0,
        TextureSampler::new(SamplerFilter::Trilinear, wgpu::AddressMode::Repeat).with_anisotropy(8),
    )?;
    renderer.set_matrix(MatrixKind::Projection, Matrix4::ortho(0.0, 1280.0, 0.0, 720.0, -1.0, 1.0));
    renderer.set_matrix(MatrixKind::World, Matrix4::translation(640.0, 360.0, 0.0));

    renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, 3)?;

    renderer.set_matrix(MatrixKind::World, Matrix4::translation(320.0, 360.0, 0.0));
    renderer.draw_indexed_primitives(PrimitiveMode::TriangleList, 0, 3)?;

    renderer.flush();
    Ok(())
}

fn upload(
    renderer: &mut Renderer<RecordingBackend>,
    kind: BufferKind,
    bytes: &[u8],
) -> Result<lumen_renderer::backend::BufferId> {
    let backend = renderer.backend_mut();
    let buffer = backend
        .create_buffer(kind, bytes.len() as u64, BufferUsage::Static)
        .with_context(|| format!("failed to create {kind:?} buffer"))?;
    backend
        .upload_buffer(buffer, 0, bytes)
        .with_context(|| format!("failed to upload {kind:?} buffer"))?;
    Ok(buffer)
}

fn print_trace(calls: &[Call]) {
    println!();
    println!("  lumen probe: {} backend command(s)", calls.len());
    println!("  ─────────────────────────────────────────");
    for (i, call) in calls.iter().enumerate() {
        let marker = if call.is_draw() { ">" } else { " " };
        println!("  {marker} {i:>3}  {call:?}");
    }
    println!();

    let draws = calls.iter().filter(|c| c.is_draw()).count();
    log::info!("{} draw(s) recorded", draws);
}
