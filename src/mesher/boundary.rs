//! Boundary scan: one quad per unit face where layer classification changes.

use crate::atlas::AtlasLayout;
use crate::grid::VoxelGrid;
use crate::mesh_output::MeshLayer;
use crate::palette::{Palette, PaletteColor};
use crate::types::{Axis, Direction, Layer, VoxelCode};

/// A face between a cell and its positive neighbour along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    /// The lower cell.
    pub cell: [i32; 3],
    /// Axis towards the neighbour.
    pub axis: Axis,
    /// Raw code of the lower cell.
    pub cell_code: VoxelCode,
    /// Raw code of the neighbour.
    pub neighbor_code: VoxelCode,
}

impl Boundary {
    /// The numerically larger code owns the face.
    pub fn cell_wins(&self) -> bool {
        self.cell_code > self.neighbor_code
    }

    /// Code that supplies UVs and colour.
    pub fn owner(&self) -> VoxelCode {
        if self.cell_wins() {
            self.cell_code
        } else {
            self.neighbor_code
        }
    }

    /// Direction the emitted face points, away from the owning cell.
    pub fn facing(&self) -> Direction {
        Direction::from_axis(self.axis, self.cell_wins())
    }

    /// Whether the quad is emitted with forward winding.
    pub fn winds_forward(&self) -> bool {
        self.axis.winds_forward(self.cell_wins())
    }

    /// Quad corners in grid coordinates, in emission order.
    pub fn corners(&self) -> [[f32; 3]; 4] {
        let [x, y, z] = self.cell;
        self.axis
            .quad_corners()
            .map(|[cx, cy, cz]| [(x + cx) as f32, (y + cy) as f32, (z + cz) as f32])
    }
}

/// Visit every boundary of `layer` in scan order.
///
/// Cells run from -1 to `dim - 1` on each axis (x outermost, z innermost) so the
/// outer shell against the air outside the grid is included. At each cell the
/// X, Y and Z neighbours are tested in that order.
pub fn scan_boundaries(grid: &VoxelGrid, layer: Layer, mut visit: impl FnMut(Boundary)) {
    let [Ok(dx), Ok(dy), Ok(dz)] = grid.dims().map(i32::try_from) else {
        log::warn!("grid {:?} is too large to scan", grid.dims());
        return;
    };

    for x in -1..dx {
        for y in -1..dy {
            for z in -1..dz {
                let cell_code = grid.get(x, y, z);
                let cell_geometry = layer.is_geometry(cell_code);

                for axis in Axis::ALL {
                    let (ox, oy, oz) = axis.offset();
                    let neighbor_code = grid.get(x + ox, y + oy, z + oz);
                    if cell_geometry == layer.is_geometry(neighbor_code) {
                        continue;
                    }
                    visit(Boundary {
                        cell: [x, y, z],
                        axis,
                        cell_code,
                        neighbor_code,
                    });
                }
            }
        }
    }
}

/// Number of quads [`mesh_layer`] will emit.
pub fn count_faces(grid: &VoxelGrid, layer: Layer) -> usize {
    let mut count = 0;
    scan_boundaries(grid, layer, |_| count += 1);
    count
}

/// Mesh one layer of a grid.
///
/// Buffers are pre-sized by a counting pass, then one quad is emitted per
/// boundary. Normals are derived from the winding once all quads are in.
pub fn mesh_layer(
    grid: &VoxelGrid,
    layer: Layer,
    palette: &Palette,
    atlas: &AtlasLayout,
) -> MeshLayer {
    let mut mesh = MeshLayer::with_quad_capacity(count_faces(grid, layer));
    let mut unknown_colors = 0usize;

    scan_boundaries(grid, layer, |boundary| {
        let owner = boundary.owner();
        let color = match palette.lookup(owner) {
            PaletteColor::OutOfRange(_) => {
                unknown_colors += 1;
                crate::palette::UNKNOWN_COLOR
            }
            resolved => resolved.rgba(),
        };
        mesh.push_quad(
            boundary.corners(),
            atlas.face_uvs(layer, owner),
            color,
            boundary.winds_forward(),
        );
    });

    mesh.recalculate_normals();

    if unknown_colors > 0 {
        log::debug!(
            "{layer} layer: {unknown_colors} faces use codes outside the {}-entry palette",
            palette.len()
        );
    }
    mesh
}
