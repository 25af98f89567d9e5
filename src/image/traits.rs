/// Read access to a row-major, tightly packed single-plane image.
pub trait ImageView {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn row(&self, y: usize) -> &[Self::Pixel];

    fn rows(&self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows { image: self, y: 0 }
    }

    /// True when `other` covers exactly the same pixel grid.
    fn same_shape<O: ImageView>(&self, other: &O) -> bool
    where
        Self: Sized,
    {
        self.width() == other.width() && self.height() == other.height()
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];
}

pub struct Rows<'a, I: ?Sized + ImageView> {
    image: &'a I,
    y: usize,
}

impl<'a, I: ImageView> Iterator for Rows<'a, I> {
    type Item = &'a [I::Pixel];

    fn next(&mut self) -> Option<Self::Item> {
        if self.y >= self.image.height() {
            return None;
        }
        let y = self.y;
        self.y += 1;
        Some(self.image.row(y))
    }
}

/// Implements [`ImageView`]/[`ImageViewMut`] for a `{ w, h, data: Vec<P> }` buffer.
macro_rules! impl_dense_view {
    ($ty:ty, $px:ty) => {
        impl $crate::image::traits::ImageView for $ty {
            type Pixel = $px;

            #[inline]
            fn width(&self) -> usize {
                self.w
            }
            #[inline]
            fn height(&self) -> usize {
                self.h
            }
            #[inline]
            fn row(&self, y: usize) -> &[$px] {
                let start = y * self.w;
                &self.data[start..start + self.w]
            }
        }

        impl $crate::image::traits::ImageViewMut for $ty {
            #[inline]
            fn row_mut(&mut self, y: usize) -> &mut [$px] {
                let start = y * self.w;
                &mut self.data[start..start + self.w]
            }
        }
    };
}

pub(crate) use impl_dense_view;
