pub mod command;
pub mod draw;
pub mod pick;
pub mod viewport;

pub mod errors {
    use lyra_core::errors::DocumentError;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    pub enum EngineError {
        #[error(transparent)]
        Document(#[from] DocumentError),
        #[error("shape `{0}` not found")]
        ShapeNotFound(String),
    }
}

pub mod scene {
    use std::collections::HashSet;

    use lyra_core::document::Document;
    use lyra_core::geometry::{Rect, Vec2};
    use lyra_core::shape::{
        AnnulusGeometry, CircleGeometry, CrossGeometry, LineGeometry, RectangleGeometry, Shape,
        ShapeGeometry, ShapeKind,
    };
    use tracing::debug;

    use crate::draw::{self, ColorRole, DrawCommand};
    use crate::errors::EngineError;
    use crate::pick;
    use crate::viewport::ViewState;

    /// 拖拽状态：是否处于拖拽中，以及本次拖拽是否作用于选中图形（否则为平移视图）。
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    struct DragState {
        active: bool,
        moves_selection: bool,
    }

    /// 编辑会话：持有文档、视图和选中集。
    ///
    /// 选中集以图形名称记录，删除或替换文档时同步清理。
    #[derive(Debug)]
    pub struct Scene {
        document: Document,
        view: ViewState,
        selected: HashSet<String>,
        drag: DragState,
    }

    /// `populate_demo` 创建的图形名称。
    #[derive(Debug, Clone)]
    pub struct DemoShapes {
        pub circle: String,
        pub filled_circle: String,
        pub annulus: String,
        pub rectangle: String,
        pub filled_rectangle: String,
        pub cross: String,
        pub line: String,
    }

    impl Scene {
        pub fn new() -> Self {
            Self {
                document: Document::new_default(),
                view: ViewState::default(),
                selected: HashSet::new(),
                drag: DragState::default(),
            }
        }

        /// 使用现有文档初始化会话。
        pub fn with_document(document: Document) -> Self {
            let mut scene = Self::new();
            scene.load_document(document);
            scene
        }

        /// 替换当前文档：清空选中集、重置视图并居中到文档范围。
        pub fn load_document(&mut self, document: Document) {
            self.document = document;
            self.selected.clear();
            self.drag = DragState::default();
            self.view.reset();

            if let Some(bounds) = self.document.bounds() {
                self.view.set_offset(bounds.center());
            }
        }

        #[inline]
        pub fn document(&self) -> &Document {
            &self.document
        }

        /// 直接修改图形字段。增删与排序请走 `Scene` 的方法以保持选中集一致。
        #[inline]
        pub fn document_mut(&mut self) -> &mut Document {
            &mut self.document
        }

        #[inline]
        pub fn view(&self) -> &ViewState {
            &self.view
        }

        #[inline]
        pub fn view_mut(&mut self) -> &mut ViewState {
            &mut self.view
        }

        /// 以编辑器默认尺寸创建图形并设为唯一选中。
        pub fn create_shape(&mut self, kind: ShapeKind) -> Result<String, EngineError> {
            let name = self.document.add_shape(Shape::template(kind))?;
            self.selected.clear();
            self.selected.insert(name.clone());
            debug!(kind = %kind, name = %name, "已创建图形");
            Ok(name)
        }

        #[inline]
        pub fn selection_len(&self) -> usize {
            self.selected.len()
        }

        #[inline]
        pub fn is_selected(&self, name: &str) -> bool {
            self.selected.contains(name)
        }

        /// 按文档顺序返回选中图形名称。
        pub fn selection(&self) -> Vec<&str> {
            self.document
                .names()
                .filter(|name| self.selected.contains(*name))
                .collect()
        }

        /// 选中图形；`additive` 为假时先清空已有选中。
        pub fn select(&mut self, name: &str, additive: bool) -> Result<(), EngineError> {
            if self.document.get(name).is_none() {
                return Err(EngineError::ShapeNotFound(name.to_string()));
            }
            if !additive {
                self.selected.clear();
            }
            self.selected.insert(name.to_string());
            Ok(())
        }

        /// 取消选中，返回之前是否处于选中状态。
        pub fn deselect(&mut self, name: &str) -> bool {
            self.selected.remove(name)
        }

        /// 切换选中状态，返回切换后的状态。
        pub fn toggle_selection(&mut self, name: &str) -> Result<bool, EngineError> {
            if self.document.get(name).is_none() {
                return Err(EngineError::ShapeNotFound(name.to_string()));
            }
            if self.selected.remove(name) {
                Ok(false)
            } else {
                self.selected.insert(name.to_string());
                Ok(true)
            }
        }

        #[inline]
        pub fn clear_selection(&mut self) {
            self.selected.clear();
        }

        pub fn select_all(&mut self) {
            self.selected = self.document.names().map(str::to_string).collect();
        }

        pub fn selection_bounds(&self) -> Option<Rect> {
            self.document
                .shapes()
                .filter(|(name, _)| self.selected.contains(*name))
                .map(|(_, shape)| shape.bounds())
                .reduce(|acc, bounds| acc.union(&bounds))
        }

        /// 按文档顺序返回第一个命中屏幕坐标的图形。
        pub fn hit_test(&self, point: Vec2) -> Option<&str> {
            self.document
                .shapes()
                .find(|(_, shape)| pick::intersect(shape, &self.view, point))
                .map(|(name, _)| name)
        }

        /// 处理单击。无修饰键时选中第一个命中的图形（未命中则清空）；
        /// 有修饰键时优先追加第一个未选中的命中图形，否则移除第一个已选中的命中图形。
        pub fn handle_click(&mut self, point: Vec2, modifier: bool) {
            if !modifier {
                let hit = self.hit_test(point).map(str::to_string);
                self.selected.clear();
                if let Some(name) = hit {
                    self.selected.insert(name);
                }
                return;
            }

            let hits: Vec<(String, bool)> = self
                .document
                .shapes()
                .filter(|(_, shape)| pick::intersect(shape, &self.view, point))
                .map(|(name, _)| (name.to_string(), self.selected.contains(name)))
                .collect();

            if let Some((name, _)) = hits.iter().find(|(_, selected)| !selected) {
                self.selected.insert(name.clone());
            } else if let Some((name, _)) = hits.first() {
                self.selected.remove(name);
            }
        }

        /// 处理拖拽的一帧。`pos` 为当前鼠标位置，`delta` 为本帧位移。
        ///
        /// 拖拽开始时根据按下位置（`pos - delta`）是否命中选中图形，决定整个拖拽
        /// 是移动选中图形还是平移视图。
        pub fn drag(&mut self, pos: Vec2, delta: Vec2) {
            if !self.drag.active {
                let press = pos - delta;
                let moves_selection = self
                    .document
                    .shapes()
                    .filter(|(name, _)| self.selected.contains(*name))
                    .any(|(_, shape)| pick::intersect(shape, &self.view, press));
                self.drag = DragState {
                    active: true,
                    moves_selection,
                };
            }

            if self.drag.moves_selection {
                let names: Vec<String> = self.selected.iter().cloned().collect();
                for name in names {
                    if let Some(shape) = self.document.get_mut(&name) {
                        pick::translate(shape, &self.view, delta);
                    }
                }
            } else {
                self.view.pan_by(delta);
            }
        }

        #[inline]
        pub fn end_drag(&mut self) {
            self.drag = DragState::default();
        }

        #[inline]
        pub fn is_dragging_selection(&self) -> bool {
            self.drag.active && self.drag.moves_selection
        }

        pub fn remove_shape(&mut self, name: &str) -> Result<Shape, EngineError> {
            let shape = self.document.remove_shape(name)?;
            self.selected.remove(name);
            Ok(shape)
        }

        /// 删除所有选中图形，返回删除数量。
        pub fn remove_selection(&mut self) -> usize {
            let names: Vec<String> = self.selection().into_iter().map(str::to_string).collect();
            let mut removed = 0;
            for name in names {
                if self.document.remove_shape(&name).is_ok() {
                    removed += 1;
                }
            }
            self.selected.clear();
            removed
        }

        /// 复制所有选中图形，副本成为新的选中集。返回副本名称（按原文档顺序）。
        pub fn duplicate_selection(&mut self) -> Result<Vec<String>, EngineError> {
            let originals: Vec<String> =
                self.selection().into_iter().map(str::to_string).collect();
            let mut copies = Vec::with_capacity(originals.len());
            for name in &originals {
                copies.push(self.document.duplicate(name)?);
            }
            if !copies.is_empty() {
                self.selected = copies.iter().cloned().collect();
            }
            Ok(copies)
        }

        pub fn move_shape(&mut self, from: usize, to: usize) -> Result<(), EngineError> {
            self.document.reorder(from, to)?;
            Ok(())
        }

        /// 视图居中到选中图形范围，无选中时退化到整个文档。
        pub fn focus_on_selection(&mut self) {
            let target = self.selection_bounds().or_else(|| self.document.bounds());
            if let Some(bounds) = target {
                self.view.set_offset(bounds.center());
            }
        }

        /// 所有图形的绘制命令，按文档顺序。
        pub fn draw_list(&self) -> Vec<DrawCommand> {
            self.document
                .shapes()
                .flat_map(|(name, shape)| {
                    let role = if self.selected.contains(name) {
                        ColorRole::Selected
                    } else {
                        ColorRole::Normal
                    };
                    draw::shape_commands(shape, &self.view, role)
                })
                .collect()
        }

        /// 填充一组示例图形（微米量级），返回其名称。
        pub fn populate_demo(&mut self) -> Result<DemoShapes, EngineError> {
            self.clear_selection();

            let circle = self.document.add_shape(Shape::new(ShapeGeometry::Circle(
                CircleGeometry {
                    center: Vec2::splat(1e-6),
                    radius: 1e-6,
                },
            )))?;
            let filled_circle = self.document.add_shape(Shape::new(
                ShapeGeometry::FilledCircle(CircleGeometry {
                    center: Vec2::splat(1e-6),
                    radius: 8e-7,
                }),
            ))?;
            let annulus = self.document.add_shape(Shape::new(ShapeGeometry::Annulus(
                AnnulusGeometry {
                    center: Vec2::new(4e-6, 1e-6),
                    radius: 1e-6,
                    inner_radius: 5e-7,
                },
            )))?;
            let rectangle = self.document.add_shape(Shape::new(ShapeGeometry::Rectangle(
                RectangleGeometry {
                    center: Vec2::new(1e-6, 3e-6),
                    dimensions: Vec2::new(2e-6, 1e-6),
                    angle: 0.0,
                    settle_time_line: 0.0,
                },
            )))?;
            let filled_rectangle = self.document.add_shape(Shape::new(
                ShapeGeometry::FilledRectangle(RectangleGeometry {
                    center: Vec2::new(4e-6, 4e-6),
                    dimensions: Vec2::new(2e-6, 3e-6),
                    angle: 30.0,
                    settle_time_line: 0.0,
                }),
            ))?;
            let cross = self.document.add_shape(Shape::new(ShapeGeometry::Cross(
                CrossGeometry {
                    center: Vec2::splat(2.5e-6),
                    width: 5e-7,
                },
            )))?;
            let line = self.document.add_shape(Shape::new(ShapeGeometry::Line(
                LineGeometry {
                    begin: Vec2::splat(6e-6),
                    end: Vec2::new(7e-6, 8e-6),
                },
            )))?;

            let shapes = DemoShapes {
                circle,
                filled_circle,
                annulus,
                rectangle,
                filled_rectangle,
                cross,
                line,
            };
            debug!(count = self.document.len(), "已创建演示图形");
            Ok(shapes)
        }
    }

    impl Default for Scene {
        fn default() -> Self {
            Self::new()
        }
    }

}
