use image::{Luma, Primitive};
use imageproc::definitions::Image;

/// 積分画像（Summed-Area Table）の構造体
///
/// 積分画像は、原点(0,0)から指定座標(x,y)までの矩形領域内の
/// 全ピクセル値の累積和を効率的に計算するためのデータ構造です。
/// クロップ窓の探索では、未知領域ピクセル数を定数時間で数えるために使います。
pub struct SummedAreaTable<T> {
    /// 積分画像のデータ
    data: Vec<T>,
    /// 画像の幅
    width: u32,
    /// 画像の高さ
    height: u32,
}

impl SummedAreaTable<u32> {
    /// 条件を満たすピクセルの個数を数える積分画像を作成します
    ///
    /// # 引数
    /// * `image` - 元となるグレースケール画像
    /// * `predicate` - 数える対象のピクセル値を判定する関数
    ///
    /// # 戻り値
    /// 条件を満たすピクセルを1、それ以外を0とした積分画像
    #[must_use]
    pub fn from_predicate<F>(image: &Image<Luma<u8>>, predicate: F) -> Self
    where
        F: Fn(u8) -> bool,
    {
        let (width, height) = image.dimensions();
        let indicator: Vec<u32> = image
            .as_raw()
            .iter()
            .map(|&value| u32::from(predicate(value)))
            .collect();
        Self::from_data(&indicator, width, height)
    }
}

impl<T> SummedAreaTable<T>
where
    T: Primitive,
{
    /// 単一チャンネルのデータから積分画像を作成します
    ///
    /// # 引数
    /// * `data` - 元となる画像データ（行優先順序）
    /// * `width` - 画像の幅
    /// * `height` - 画像の高さ
    ///
    /// # 戻り値
    /// 作成された積分画像
    pub fn from_data(data: &[T], width: u32, height: u32) -> Self {
        assert_eq!(data.len(), (width * height) as usize);

        let mut sat_data = vec![T::zero(); (width * height) as usize];

        for y in 0..height {
            for x in 0..width {
                let current_index = (y * width + x) as usize;

                // sat(x, y) = src(x, y) + sat(x-1, y) + sat(x, y-1) - sat(x-1, y-1)
                let mut sum = data[current_index];

                if x > 0 {
                    sum = sum + sat_data[current_index - 1];
                }

                if y > 0 {
                    sum = sum + sat_data[((y - 1) * width + x) as usize];
                }

                // 左上の重複分を除去
                if x > 0 && y > 0 {
                    sum = sum - sat_data[((y - 1) * width + (x - 1)) as usize];
                }

                sat_data[current_index] = sum;
            }
        }

        Self {
            data: sat_data,
            width,
            height,
        }
    }

    /// 指定された座標での積分画像の値を取得します
    ///
    /// # 戻り値
    /// 積分画像の値、座標が範囲外の場合は0
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> T {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            T::zero()
        } else {
            self.data[(y as u64 * u64::from(self.width) + x as u64) as usize]
        }
    }

    /// 指定された矩形領域内のピクセル値の合計を計算します
    ///
    /// # 引数
    /// * `x1` - 矩形の左上X座標（含む）
    /// * `y1` - 矩形の左上Y座標（含む）
    /// * `x2` - 矩形の右下X座標（含む）
    /// * `y2` - 矩形の右下Y座標（含む）
    ///
    /// # 計算式
    /// Sum = sat(x2, y2) - sat(x1-1, y2) - sat(x2, y1-1) + sat(x1-1, y1-1)
    #[must_use]
    pub fn rectangle_sum(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> T {
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(i64::from(self.width) - 1);
        let y2 = y2.min(i64::from(self.height) - 1);

        if x1 > x2 || y1 > y2 {
            return T::zero();
        }

        let bottom_right = self.get(x2, y2);
        let top_right = self.get(x2, y1 - 1);
        let bottom_left = self.get(x1 - 1, y2);
        let top_left = self.get(x1 - 1, y1 - 1);

        bottom_right + top_left - top_right - bottom_left
    }

    /// 左上座標とサイズで指定した窓の合計を計算します
    #[must_use]
    pub fn window_sum(&self, x: u32, y: u32, width: u32, height: u32) -> T {
        if width == 0 || height == 0 {
            return T::zero();
        }
        let (x, y) = (i64::from(x), i64::from(y));
        self.rectangle_sum(x, y, x + i64::from(width) - 1, y + i64::from(height) - 1)
    }

    /// 画像の幅を取得します
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// 画像の高さを取得します
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}
