//! Material and shader bank.
//!
//! The bank is a fixed set of named materials. Three of them sample a single
//! texture (flat, matcap and translucent shading), the two fire materials run
//! different fragment programs over one shared uniform block.
//!
//! The CPU description ([`MaterialBank`]) is separate from the bind groups
//! ([`GpuMaterials`]) so that assignment and uniform sharing can be reasoned
//! about and tested without a device.

use std::{cell::Cell, collections::HashMap, rc::Rc};

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

/// Every image the scene samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Palette,
    Candle,
    GoldMatcap,
    Nameplate,
    RedCherry,
    Background,
    FireOpacity,
    FireEmissive,
    Leaf,
}

impl TextureKey {
    pub const ALL: [TextureKey; 9] = [
        TextureKey::Palette,
        TextureKey::Candle,
        TextureKey::GoldMatcap,
        TextureKey::Nameplate,
        TextureKey::RedCherry,
        TextureKey::Background,
        TextureKey::FireOpacity,
        TextureKey::FireEmissive,
        TextureKey::Leaf,
    ];

    pub fn path(self) -> &'static str {
        match self {
            TextureKey::Palette => "textures/palette1.jpg",
            TextureKey::Candle => "textures/candle.jpg",
            TextureKey::GoldMatcap => "textures/matcap-gold-3.png",
            TextureKey::Nameplate => "textures/nameplate.jpg",
            TextureKey::RedCherry => "textures/RedCherry.jpg",
            TextureKey::Background => "textures/bgRenderer.jpg",
            TextureKey::FireOpacity => "textures/candleFireAlpha.jpg",
            TextureKey::FireEmissive => "textures/candleFire.jpg",
            TextureKey::Leaf => "textures/LeafParticle.png",
        }
    }

    /// Whether the image holds display-referred colour.
    pub fn srgb(self) -> bool {
        matches!(
            self,
            TextureKey::Candle
                | TextureKey::Nameplate
                | TextureKey::Background
                | TextureKey::FireOpacity
                | TextureKey::FireEmissive
        )
    }

    /// Colour of the 1×1 stand-in bound until the image arrives.
    fn placeholder(self) -> [u8; 4] {
        match self {
            // no flames and an empty sky until the real maps exist
            TextureKey::FireOpacity | TextureKey::FireEmissive | TextureKey::Background => {
                [0, 0, 0, 255]
            }
            TextureKey::Leaf => [255, 255, 255, 0],
            _ => [255, 255, 255, 255],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    ColorPalette,
    Candle,
    GoldMatcap,
    Nameplate,
    RedCherry,
    Sakura,
    FireA,
    FireB,
}

impl MaterialKey {
    pub const ALL: [MaterialKey; 8] = [
        MaterialKey::ColorPalette,
        MaterialKey::Candle,
        MaterialKey::GoldMatcap,
        MaterialKey::Nameplate,
        MaterialKey::RedCherry,
        MaterialKey::Sakura,
        MaterialKey::FireA,
        MaterialKey::FireB,
    ];
}

/// The two fragment programs of the flame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireProgram {
    A,
    B,
}

/// Uniform block shared by both fire programs.
///
/// Layout matches `FireUniforms` in `fire_common.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FireUniforms {
    pub time: f32,
    pub animation_multiplier: f32,
    pub animation_multiplier2: f32,
    pub opacity_multiplier: f32,
    pub emissive_multiplier: f32,
    pub _padding: f32,
    pub frequency: [f32; 2],
}

impl Default for FireUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            animation_multiplier: 0.5,
            animation_multiplier2: 0.8,
            opacity_multiplier: 1.0,
            emissive_multiplier: 0.6,
            _padding: 0.0,
            frequency: [0.12, 0.12],
        }
    }
}

/// Handle to the one uniform block every fire material refers to.
///
/// Clones share the block. The frame loop and the debug panel write through it,
/// the renderer reads it once per frame when uploading.
#[derive(Clone, Debug, Default)]
pub struct SharedUniforms(Rc<Cell<FireUniforms>>);

impl SharedUniforms {
    pub fn new(values: FireUniforms) -> Self {
        Self(Rc::new(Cell::new(values)))
    }

    pub fn get(&self) -> FireUniforms {
        self.0.get()
    }

    pub fn set_time(&self, time: f32) {
        self.update(|u| u.time = time);
    }

    pub fn update(&self, f: impl FnOnce(&mut FireUniforms)) {
        let mut values = self.0.get();
        f(&mut values);
        self.0.set(values);
    }

    /// `true` when both handles refer to the same block.
    pub fn ptr_eq(&self, other: &SharedUniforms) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, Debug)]
pub enum MaterialKind {
    /// Unlit colour map.
    Flat { map: TextureKey },
    /// Reflection captured in a matcap image, looked up by view-space normal.
    Matcap { matcap: TextureKey },
    /// Alpha-blended, double-sided colour map.
    Translucent { map: TextureKey },
    /// Additive, double-sided flame.
    Fire {
        program: FireProgram,
        uniforms: SharedUniforms,
    },
}

#[derive(Clone, Debug)]
pub struct Material {
    pub key: MaterialKey,
    pub kind: MaterialKind,
}

impl Material {
    /// Textures the material samples, in binding order.
    pub fn textures(&self) -> Vec<TextureKey> {
        match &self.kind {
            MaterialKind::Flat { map } | MaterialKind::Translucent { map } => vec![*map],
            MaterialKind::Matcap { matcap } => vec![*matcap],
            MaterialKind::Fire { .. } => vec![TextureKey::FireOpacity, TextureKey::FireEmissive],
        }
    }
}

#[derive(Debug)]
pub struct MaterialBank {
    materials: Vec<Material>,
    uniforms: SharedUniforms,
}

impl MaterialBank {
    pub fn new(fire: FireUniforms) -> Self {
        let uniforms = SharedUniforms::new(fire);
        let materials = MaterialKey::ALL
            .iter()
            .map(|&key| {
                let kind = match key {
                    MaterialKey::ColorPalette => MaterialKind::Flat {
                        map: TextureKey::Palette,
                    },
                    MaterialKey::Candle => MaterialKind::Flat {
                        map: TextureKey::Candle,
                    },
                    MaterialKey::GoldMatcap => MaterialKind::Matcap {
                        matcap: TextureKey::GoldMatcap,
                    },
                    MaterialKey::Nameplate => MaterialKind::Flat {
                        map: TextureKey::Nameplate,
                    },
                    MaterialKey::RedCherry => MaterialKind::Flat {
                        map: TextureKey::RedCherry,
                    },
                    MaterialKey::Sakura => MaterialKind::Translucent {
                        map: TextureKey::Leaf,
                    },
                    MaterialKey::FireA => MaterialKind::Fire {
                        program: FireProgram::A,
                        uniforms: uniforms.clone(),
                    },
                    MaterialKey::FireB => MaterialKind::Fire {
                        program: FireProgram::B,
                        uniforms: uniforms.clone(),
                    },
                };
                Material { key, kind }
            })
            .collect();
        Self {
            materials,
            uniforms,
        }
    }

    pub fn get(&self, key: MaterialKey) -> &Material {
        // the bank is built from MaterialKey::ALL in declaration order
        &self.materials[key as usize]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn uniforms(&self) -> &SharedUniforms {
        &self.uniforms
    }

    /// The single write of elapsed time per frame.
    pub fn set_time(&self, elapsed: f32) {
        self.uniforms.set_time(elapsed);
    }

    /// Uniform block as seen through a given material; `None` for materials
    /// without one.
    pub fn uniforms_of(&self, key: MaterialKey) -> Option<&SharedUniforms> {
        match &self.get(key).kind {
            MaterialKind::Fire { uniforms, .. } => Some(uniforms),
            _ => None,
        }
    }
}

/// Bind group layouts of the material stage (group 1 of every geometry
/// pipeline).
#[derive(Clone, Debug)]
pub struct MaterialLayouts {
    /// One filterable texture and its sampler.
    pub texture: wgpu::BindGroupLayout,
    /// Fire uniform block, opacity map and emissive map.
    pub fire: wgpu::BindGroupLayout,
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

impl MaterialLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[texture_entry(0), sampler_entry(1)],
            label: Some("texture_bind_group_layout"),
        });
        let fire = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                sampler_entry(2),
                texture_entry(3),
                sampler_entry(4),
            ],
            label: Some("fire_bind_group_layout"),
        });
        Self { texture, fire }
    }

    pub fn texture_bind_group(
        &self,
        device: &wgpu::Device,
        texture: &Texture,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(label),
        })
    }
}

/// Bind groups of the bank, the fire uniform buffer and the textures behind
/// them.
pub struct GpuMaterials {
    textures: HashMap<TextureKey, Texture>,
    bind_groups: HashMap<MaterialKey, wgpu::BindGroup>,
    background: wgpu::BindGroup,
    fallback: wgpu::BindGroup,
    fire_buffer: wgpu::Buffer,
}

impl GpuMaterials {
    /// Binds every material to placeholder textures.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &MaterialLayouts,
        bank: &MaterialBank,
    ) -> Self {
        let textures: HashMap<TextureKey, Texture> = TextureKey::ALL
            .iter()
            .map(|&key| {
                let placeholder =
                    Texture::create_placeholder(device, queue, key.placeholder(), key.path());
                (key, placeholder)
            })
            .collect();
        let fire_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fire Uniform Buffer"),
            contents: bytemuck::cast_slice(&[bank.uniforms().get()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let white = Texture::create_placeholder(device, queue, [255, 255, 255, 255], "fallback");
        let fallback = layouts.texture_bind_group(device, &white, "fallback_bind_group");
        let background = layouts.texture_bind_group(
            device,
            &textures[&TextureKey::Background],
            "background_bind_group",
        );

        let mut materials = Self {
            textures,
            bind_groups: HashMap::new(),
            background,
            fallback,
            fire_buffer,
        };
        for material in bank.materials() {
            materials.rebind(device, layouts, material);
        }
        materials
    }

    fn rebind(&mut self, device: &wgpu::Device, layouts: &MaterialLayouts, material: &Material) {
        let label = format!("{:?}_bind_group", material.key);
        let bind_group = match &material.kind {
            MaterialKind::Flat { map } | MaterialKind::Translucent { map } => {
                layouts.texture_bind_group(device, &self.textures[map], &label)
            }
            MaterialKind::Matcap { matcap } => {
                layouts.texture_bind_group(device, &self.textures[matcap], &label)
            }
            MaterialKind::Fire { .. } => {
                let opacity = &self.textures[&TextureKey::FireOpacity];
                let emissive = &self.textures[&TextureKey::FireEmissive];
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &layouts.fire,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: self.fire_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&opacity.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&opacity.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::TextureView(&emissive.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: wgpu::BindingResource::Sampler(&emissive.sampler),
                        },
                    ],
                    label: Some(&label),
                })
            }
        };
        self.bind_groups.insert(material.key, bind_group);
    }

    /// Swaps in a loaded texture and rebuilds every bind group that samples it.
    pub fn set_texture(
        &mut self,
        device: &wgpu::Device,
        layouts: &MaterialLayouts,
        bank: &MaterialBank,
        key: TextureKey,
        texture: Texture,
    ) {
        self.textures.insert(key, texture);
        if key == TextureKey::Background {
            self.background = layouts.texture_bind_group(
                device,
                &self.textures[&TextureKey::Background],
                "background_bind_group",
            );
        }
        for material in bank
            .materials()
            .iter()
            .filter(|material| material.textures().contains(&key))
        {
            self.rebind(device, layouts, material);
        }
    }

    /// Uploads the shared uniform block. Both fire bind groups reference the
    /// same buffer, so one write serves both programs.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, bank: &MaterialBank) {
        queue.write_buffer(
            &self.fire_buffer,
            0,
            bytemuck::cast_slice(&[bank.uniforms().get()]),
        );
    }

    pub fn bind_group(&self, key: MaterialKey) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(&key)
    }

    pub fn background(&self) -> &wgpu::BindGroup {
        &self.background
    }

    /// White texture for meshes no manifest entry covers.
    pub fn fallback(&self) -> &wgpu::BindGroup {
        &self.fallback
    }
}
