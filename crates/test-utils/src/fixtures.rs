//! ASCII response fixtures for the transect datasets.
//!
//! Each fixture mirrors what the server returns for the matching request,
//! including the structural preamble above the dash delimiter.

/// The dash line separating preamble from payload blocks.
pub const DELIMITER: &str = "---------------------------------------------";

/// Altitude profiles.
pub mod profile {
    /// Three cross-shore positions, two years, one sentinel reading.
    pub const ANNOTATED_WITH_SENTINEL: &str = "\
Dataset {
    Float64 cross_shore[cross_shore = 3];
    Float64 time[time = 2];
    Float64 altitude[time = 2][alongshore = 1][cross_shore = 3];
} jarkus/profiles/transect.nc;
---------------------------------------------
cross_shore[3]
10, 20, 30

time[2]
2010, 2011

altitude[2][1][3]
[0][0], 1.5, 2.5, 3.5
[1][0], -9999, 5.5, 6.5
";

    /// Grid-style response: namespaced headers, map vectors and wrapped rows.
    pub const GRID_WRAPPED: &str = "\
Dataset {
    Grid {
     ARRAY:
        Float32 altitude[time = 3][alongshore = 1][cross_shore = 4];
     MAPS:
        Float64 time[time = 3];
        Float64 alongshore[alongshore = 1];
        Float64 cross_shore[cross_shore = 4];
    } altitude;
    Float64 time[time = 3];
    Float64 cross_shore[cross_shore = 4];
} jarkus/profiles/transect.nc;
---------------------------------------------
time[3]
12784, 13149,
 13514

cross_shore[4]
-100, -50, 0, 50

altitude.altitude[3][1][4]
[0][0], 6.2, 4.1,
  2.0, NaN
[1][0], 6.0, 3.9, 1.8, -0.4
[2][0], 5.8, -9999, 1.5, -0.6
altitude.time[3]
12784, 13149, 13514
altitude.alongshore[1]
3
altitude.cross_shore[4]
-100, -50, 0, 50
";

    /// Altitude emitted as `[cross_shore][time]`.
    pub const TRANSPOSED: &str = "\
---------------------------------------------
cross_shore[3]
10, 20, 30
time[2]
2010, 2011
altitude[3][2]
1.0, 4.0, 2.0, 5.0, 3.0, 6.0
";

    /// Time axis with explicit units in the attribute preamble.
    pub const WITH_UNITS: &str = "\
Attributes {
    time {
        String units \"days since 1970-01-01 00:00:00 +0:00\";
        String long_name \"time\";
    }
    cross_shore {
        String units \"m\";
    }
}
---------------------------------------------
cross_shore[2]
0, 25
time[2]
2000, 2001
altitude[2][1][2]
[0][0], 1.0, 2.0
[1][0], 3.0, 4.0
";

    /// Time axis present but empty.
    pub const EMPTY_TIME: &str = "\
---------------------------------------------
cross_shore[2]
0, 25
time[0]

altitude[0][1][2]
";

    /// Altitude stream one value short of its header.
    pub const SHORT_ALTITUDE: &str = "\
---------------------------------------------
cross_shore[3]
10, 20, 30
time[2]
2010, 2011
altitude[2][1][3]
[0][0], 1.5, 2.5, 3.5
[1][0], 4.5, 5.5
";
}

/// Identifier catalogs.
pub mod catalog {
    /// Preamble mentions the full catalog size; the payload holds a slice.
    pub const PREAMBLE_DECLARES_SIZE: &str = "\
Dataset {
    Int32 id[id = 2465];
} jarkus/profiles/transect.nc;
id[2465]
---------------------------------------------
id[4]
2000100, 2000120, 2000140, 2000160
";

    /// Payload echoes the declared size as its first value.
    pub const SIZE_ARTIFACT: &str = "\
---------------------------------------------
id[4]
2465, 7003800, 7003900, 7004000
";

    /// Header line carries trailing text, so only a raw scan finds the values.
    pub const LOOSE_HEADER: &str = "\
---------------------------------------------
id[3] (truncated)
7003800, NaN, 7004000
";
}

/// Area codes and names.
pub mod areas {
    pub const THREE_AREAS: &str = "\
Dataset {
    Int32 areacode[alongshore = 3];
    String areaname[alongshore = 3];
} jarkus/profiles/transect.nc;
---------------------------------------------
areacode[3]
2, 3, 7

areaname[3]
\" Noord-Holland\", \"Zuid-Holland \", \"Zeeland\"
";

    pub const MISMATCHED: &str = "\
---------------------------------------------
areacode[3]
2, 3, 7
areaname[2]
\"Noord-Holland\", \"Zuid-Holland\"
";
}

/// Reference-point coordinates.
pub mod reference_points {
    pub const TWO_POINTS: &str = "\
---------------------------------------------
rsp_x[2]
103453.5, 103460.1
rsp_y[2]
514620.2, -9999
rsp_lat[2]
52.6201, 52.6215
rsp_lon[2]
4.6352, NaN
";

    pub const MISMATCHED: &str = "\
---------------------------------------------
rsp_x[2]
103453.5, 103460.1
rsp_y[2]
514620.2, 514630.0
rsp_lat[1]
52.6201
rsp_lon[2]
4.6352, 4.6360
";
}

/// Water-level and coastline series.
pub mod series {
    /// Day-offset time axis with both water levels.
    pub const WATER_LEVELS: &str = "\
---------------------------------------------
time[3]
10957, 11323, 11688
mean_high_water[3]
1.02, -9999, 1.08
mean_low_water[3]
-0.81, -0.83, NaN
";

    /// Year time axis with one coastline variable.
    pub const COASTLINE: &str = "\
---------------------------------------------
time[4]
1965, 1966, 1967, 1968
momentary_coastline[4]
112.5, 115.0, NaN, 109.75
";
}
