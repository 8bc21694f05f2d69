/// Returns a frequency count of the input data, one counter per byte value.
pub fn freqs(data: &[u8]) -> [u32; 256] {
    let mut freqs = [0_u32; 256];
    // Four interleaved tables avoid the store-to-load stall on runs of one byte.
    let mut lanes = [[0_u32; 256]; 4];
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        lanes[0][chunk[0] as usize] += 1;
        lanes[1][chunk[1] as usize] += 1;
        lanes[2][chunk[2] as usize] += 1;
        lanes[3][chunk[3] as usize] += 1;
    }
    chunks
        .remainder()
        .iter()
        .for_each(|&el| freqs[el as usize] += 1);
    for (i, freq) in freqs.iter_mut().enumerate() {
        *freq += lanes[0][i] + lanes[1][i] + lanes[2][i] + lanes[3][i];
    }
    freqs
}

/// Converts a frequency table into the start offset of each byte value in sorted order.
pub fn cumulative(freqs: &[u32; 256]) -> [u32; 256] {
    let mut sum = 0_u32;
    let mut starts = [0_u32; 256];
    for (start, &freq) in starts.iter_mut().zip(freqs.iter()) {
        *start = sum;
        sum += freq;
    }
    starts
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn freqs_test() {
        let f = freqs(b"abracadabra");
        assert_eq!(f[b'a' as usize], 5);
        assert_eq!(f[b'b' as usize], 2);
        assert_eq!(f[b'r' as usize], 2);
        assert_eq!(f[b'c' as usize], 1);
        assert_eq!(f[b'd' as usize], 1);
        assert_eq!(f.iter().sum::<u32>(), 11);
    }

    #[test]
    fn cumulative_test() {
        let f = freqs(b"banana");
        let c = cumulative(&f);
        assert_eq!(c[b'a' as usize], 0);
        assert_eq!(c[b'b' as usize], 3);
        assert_eq!(c[b'n' as usize], 4);
        assert_eq!(c[255], 6);
    }
}
