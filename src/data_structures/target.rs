//! Off-screen render targets.
//!
//! A [`RenderTarget`] owns the attachments of one off-screen destination:
//! a color texture (multisampled or not) and either a depth/stencil
//! attachment matching the color sample count or a depth-only shadow map.
//! Attachments are created in color-then-depth order and validated with
//! [`RenderTarget::completeness`] after construction; an incomplete target is
//! reported and logged, never a panic, and the frame keeps rendering.

use thiserror::Error;

use crate::data_structures::texture::Texture;

/// Sample mode, chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Multisampled { samples: u32 },
    SingleSampled,
}

impl SampleMode {
    pub fn from_sample_count(samples: u32) -> Self {
        if samples > 1 {
            SampleMode::Multisampled { samples }
        } else {
            SampleMode::SingleSampled
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            SampleMode::Multisampled { samples } => *samples,
            SampleMode::SingleSampled => 1,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("render target has no attachments")]
    Empty,
    #[error("depth attachment requested before the color attachment exists")]
    ColorFirst,
    #[error("color and depth sample counts differ (color {color}, depth {depth})")]
    SampleMismatch { color: u32, depth: u32 },
    #[error("color {0}x{1} and depth {2}x{3} attachment sizes differ")]
    ExtentMismatch(u32, u32, u32, u32),
}

#[derive(Debug)]
struct ColorAttachment {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    samples: u32,
    width: u32,
    height: u32,
}

#[derive(Debug)]
enum DepthAttachment {
    /// Combined depth/stencil store matching the color sample count.
    DepthStencil {
        _texture: wgpu::Texture,
        view: wgpu::TextureView,
        samples: u32,
        width: u32,
        height: u32,
    },
    /// Depth-only texture for shadow rendering; always single-sampled and
    /// bindable for later sampling.
    ShadowMap { texture: Texture, width: u32, height: u32 },
}

#[derive(Debug)]
pub struct RenderTarget {
    label: String,
    width: u32,
    height: u32,
    mode: SampleMode,
    color_format: wgpu::TextureFormat,
    color: Option<ColorAttachment>,
    depth: Option<DepthAttachment>,
}

impl RenderTarget {
    pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat =
        wgpu::TextureFormat::Depth24PlusStencil8;

    /// An empty target bound to no attachments.
    pub fn new(
        width: u32,
        height: u32,
        mode: SampleMode,
        color_format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        Self {
            label: label.to_string(),
            width: width.max(1),
            height: height.max(1),
            mode,
            color_format,
            color: None,
            depth: None,
        }
    }

    /// Allocate and attach the color texture, sized to the target and using
    /// the configured sample mode. `extra_usage` lets single-sampled targets
    /// opt into being sampled or copied by later passes.
    pub fn create_color_attachment(
        &mut self,
        device: &wgpu::Device,
        extra_usage: wgpu::TextureUsages,
    ) {
        let samples = self.mode.count();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{} color", self.label)),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: samples,
            dimension: wgpu::TextureDimension::D2,
            format: self.color_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | extra_usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.color = Some(ColorAttachment {
            texture,
            view,
            samples,
            width: self.width,
            height: self.height,
        });
    }

    /// Allocate and attach a combined depth/stencil store matching the color
    /// attachment's sample count.
    pub fn create_depth_stencil_attachment(
        &mut self,
        device: &wgpu::Device,
    ) -> Result<(), TargetError> {
        if self.color.is_none() {
            return Err(TargetError::ColorFirst);
        }
        let samples = self.mode.count();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{} depth_stencil", self.label)),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: samples,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthAttachment::DepthStencil {
            _texture: texture,
            view,
            samples,
            width: self.width,
            height: self.height,
        });
        Ok(())
    }

    /// Attach a depth-only texture and no color attachment, turning this
    /// target into a shadow map.
    pub fn create_shadow_map(&mut self, device: &wgpu::Device) {
        let texture = Texture::create_depth_texture(
            device,
            [self.width, self.height],
            &format!("{} shadow_map", self.label),
        );
        self.depth = Some(DepthAttachment::ShadowMap {
            texture,
            width: self.width,
            height: self.height,
        });
    }

    /// The color attachment's view. Callers never branch on the sample mode.
    pub fn color_view(&self) -> Option<&wgpu::TextureView> {
        self.color.as_ref().map(|c| &c.view)
    }

    pub fn color_texture(&self) -> Option<&wgpu::Texture> {
        self.color.as_ref().map(|c| &c.texture)
    }

    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        match &self.depth {
            Some(DepthAttachment::DepthStencil { view, .. }) => Some(view),
            Some(DepthAttachment::ShadowMap { texture, .. }) => Some(&texture.view),
            None => None,
        }
    }

    pub fn sample_mode(&self) -> SampleMode {
        self.mode
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_stencil(&self) -> bool {
        matches!(self.depth, Some(DepthAttachment::DepthStencil { .. }))
    }

    /// Validate the attachment set. Mismatched sample counts or extents make
    /// the target unusable as a pass destination; report that instead of
    /// letting the pass fail with undefined output.
    pub fn completeness(&self) -> Result<(), TargetError> {
        let color = self
            .color
            .as_ref()
            .map(|c| AttachmentInfo {
                samples: c.samples,
                width: c.width,
                height: c.height,
            });
        let depth = self.depth.as_ref().map(|d| match d {
            DepthAttachment::DepthStencil {
                samples,
                width,
                height,
                ..
            } => AttachmentInfo {
                samples: *samples,
                width: *width,
                height: *height,
            },
            DepthAttachment::ShadowMap { width, height, .. } => AttachmentInfo {
                samples: 1,
                width: *width,
                height: *height,
            },
        });
        check_attachments(color.as_ref(), depth.as_ref())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AttachmentInfo {
    pub samples: u32,
    pub width: u32,
    pub height: u32,
}

pub(crate) fn check_attachments(
    color: Option<&AttachmentInfo>,
    depth: Option<&AttachmentInfo>,
) -> Result<(), TargetError> {
    match (color, depth) {
        (None, None) => Err(TargetError::Empty),
        (Some(color), Some(depth)) => {
            if color.samples != depth.samples {
                return Err(TargetError::SampleMismatch {
                    color: color.samples,
                    depth: depth.samples,
                });
            }
            if (color.width, color.height) != (depth.width, depth.height) {
                return Err(TargetError::ExtentMismatch(
                    color.width,
                    color.height,
                    depth.width,
                    depth.height,
                ));
            }
            Ok(())
        }
        // Color-only (post-process) and depth-only (shadow) targets are
        // complete on their own.
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_sample_counts_report_incomplete_without_panicking() {
        let color = AttachmentInfo {
            samples: 4,
            width: 800,
            height: 600,
        };
        let depth = AttachmentInfo {
            samples: 1,
            width: 800,
            height: 600,
        };
        assert_eq!(
            check_attachments(Some(&color), Some(&depth)),
            Err(TargetError::SampleMismatch { color: 4, depth: 1 })
        );
    }

    #[test]
    fn matching_attachments_are_complete() {
        let info = AttachmentInfo {
            samples: 4,
            width: 800,
            height: 600,
        };
        assert_eq!(check_attachments(Some(&info), Some(&info)), Ok(()));
    }

    #[test]
    fn single_attachment_targets_are_complete() {
        let info = AttachmentInfo {
            samples: 1,
            width: 1024,
            height: 1024,
        };
        assert_eq!(check_attachments(None, Some(&info)), Ok(()));
        assert_eq!(check_attachments(Some(&info), None), Ok(()));
    }

    #[test]
    fn no_attachments_is_incomplete() {
        assert_eq!(check_attachments(None, None), Err(TargetError::Empty));
    }

    #[test]
    fn sample_mode_from_count() {
        assert_eq!(SampleMode::from_sample_count(1), SampleMode::SingleSampled);
        assert_eq!(
            SampleMode::from_sample_count(4),
            SampleMode::Multisampled { samples: 4 }
        );
        assert_eq!(SampleMode::from_sample_count(4).count(), 4);
        assert_eq!(SampleMode::SingleSampled.count(), 1);
    }
}
